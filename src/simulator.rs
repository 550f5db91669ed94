use std::path::Path;

use log::{debug, info};

use crate::backend::{NativeBackend, SpiceBackend};
use crate::vectors::{display_name, Vector, VectorSet};
use crate::Result;

/// Handle to a loaded ngspice shared library.
///
/// All simulation state lives inside the native library, which is mapped
/// process-wide: create one `NgSpice` per process and keep it for the
/// process lifetime. There is no unload path; dropping the handle leaves
/// the library mapped. The native library is not designed for multiple
/// independent simulation contexts, so concurrent handles are unsupported.
///
/// No validation is performed on command or circuit text. Everything is
/// forwarded verbatim, and malformed input can make the native library
/// fault or terminate the process; such failures are not caught or
/// translated by this layer.
pub struct NgSpice {
    backend: Box<dyn SpiceBackend>,
}

impl NgSpice {
    /// Discover the ngspice library by its conventional name and load it.
    pub fn new() -> Result<Self> {
        Self::open(None)
    }

    /// Load the ngspice library from an explicit path.
    pub fn with_library(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Some(path.as_ref()))
    }

    fn open(path: Option<&Path>) -> Result<Self> {
        let backend = NativeBackend::open(path)?;
        info!("ngspice loaded from {}", backend.path().display());
        Ok(NgSpice {
            backend: Box::new(backend),
        })
    }

    #[cfg(test)]
    fn with_backend(backend: Box<dyn SpiceBackend>) -> Self {
        NgSpice { backend }
    }

    /// Send a single command line to the simulator, unmodified.
    pub fn send_cmd(&mut self, cmd: &str) -> Result<()> {
        debug!("command: {}", cmd);
        self.backend.command(cmd)
    }

    /// Have the simulator load and execute a command file from disk.
    /// Equivalent to `send_cmd("source <path>")`; the file is read by the
    /// native library, not by this layer.
    pub fn source(&mut self, path: &str) -> Result<()> {
        self.send_cmd(&format!("source {}", path))
    }

    /// Feed a circuit definition to the simulator line by line, in order.
    /// The deck is the same text a spice command file would contain,
    /// finished with a `.end` line.
    pub fn send_circ<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.backend.circuit_line(line.as_ref())?;
        }
        Ok(())
    }

    /// Run the analyses of the currently loaded circuit.
    pub fn run(&mut self) -> Result<()> {
        self.send_cmd("run")
    }

    /// Ask the simulator to wind down.
    pub fn quit(&mut self) -> Result<()> {
        self.send_cmd("quit")
    }

    /// Name of the plot holding the most recent results.
    pub fn current_plot(&self) -> Result<String> {
        self.backend.current_plot()
    }

    /// Names of all result plots the simulator holds.
    pub fn plots(&self) -> Result<Vec<String>> {
        self.backend.all_plots()
    }

    /// Qualified `<plot>.<vector>` names of all vectors in a plot, or in
    /// the current plot when `plot` is `None`.
    pub fn vector_names(&self, plot: Option<&str>) -> Result<Vec<String>> {
        let plot = self.resolve_plot(plot)?;
        let names = self.backend.all_vecs(&plot)?;
        Ok(names
            .into_iter()
            .map(|name| format!("{}.{}", plot, name))
            .collect())
    }

    /// Copy one vector out of the simulator. A bare name refers to the
    /// current plot; `<plot>.<name>` reaches into any plot.
    pub fn vector(&self, name: &str) -> Result<Vector> {
        self.backend.vector(name)
    }

    /// Copy every vector of a plot out of the simulator, with source
    /// currents renamed from `<source>#branch` to `i(<source>)`.
    pub fn vectors(&self, plot: Option<&str>) -> Result<VectorSet> {
        let plot = self.resolve_plot(plot)?;
        let mut vectors = Vec::new();
        for name in self.backend.all_vecs(&plot)? {
            let mut vector = self.backend.vector(&format!("{}.{}", plot, name))?;
            vector.name = display_name(&vector.name);
            vectors.push(vector);
        }
        Ok(VectorSet { plot, vectors })
    }

    fn resolve_plot(&self, plot: Option<&str>) -> Result<String> {
        match plot {
            Some(plot) => Ok(plot.to_string()),
            None => self.backend.current_plot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectors::VectorData;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Records every string crossing the backend seam, standing in for the
    /// native library.
    #[derive(Default)]
    struct RecordingBackend {
        commands: Arc<Mutex<Vec<String>>>,
        circuit_lines: Arc<Mutex<Vec<String>>>,
        plots: Vec<String>,
        vecs: HashMap<String, Vec<String>>,
        vectors: HashMap<String, Vector>,
    }

    impl SpiceBackend for RecordingBackend {
        fn command(&self, cmd: &str) -> Result<()> {
            self.commands.lock().unwrap().push(cmd.to_string());
            Ok(())
        }

        fn circuit_line(&self, line: &str) -> Result<()> {
            self.circuit_lines.lock().unwrap().push(line.to_string());
            Ok(())
        }

        fn current_plot(&self) -> Result<String> {
            Ok(self.plots.first().cloned().unwrap_or_default())
        }

        fn all_plots(&self) -> Result<Vec<String>> {
            Ok(self.plots.clone())
        }

        fn all_vecs(&self, plot: &str) -> Result<Vec<String>> {
            Ok(self.vecs.get(plot).cloned().unwrap_or_default())
        }

        fn vector(&self, name: &str) -> Result<Vector> {
            self.vectors
                .get(name)
                .cloned()
                .ok_or_else(|| crate::NgSpiceError::VectorNotFound(name.to_string()))
        }
    }

    fn recording_connector() -> (NgSpice, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let backend = RecordingBackend::default();
        let commands = backend.commands.clone();
        let circuit_lines = backend.circuit_lines.clone();
        (
            NgSpice::with_backend(Box::new(backend)),
            commands,
            circuit_lines,
        )
    }

    #[test]
    fn test_send_cmd_forwards_verbatim() {
        let (mut ng, commands, _) = recording_connector();
        ng.send_cmd("tran 1u 1m").unwrap();
        ng.send_cmd("print v(out)").unwrap();
        assert_eq!(
            *commands.lock().unwrap(),
            vec!["tran 1u 1m".to_string(), "print v(out)".to_string()]
        );
    }

    #[test]
    fn test_source_matches_send_cmd_byte_for_byte() {
        let (mut ng, commands, _) = recording_connector();
        ng.source("/tmp/rc_filter.cir").unwrap();
        ng.send_cmd("source /tmp/rc_filter.cir").unwrap();

        let commands = commands.lock().unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], commands[1]);
    }

    #[test]
    fn test_source_does_not_check_the_path() {
        let (mut ng, commands, _) = recording_connector();
        ng.source("does/not/exist.cir").unwrap();
        assert_eq!(
            commands.lock().unwrap().as_slice(),
            ["source does/not/exist.cir"]
        );
    }

    #[test]
    fn test_send_circ_forwards_each_line_in_order() {
        let (mut ng, commands, circuit_lines) = recording_connector();
        let deck = ["R1 n1 0 10k", "V1 n1 0 DC 10", ".op", ".end"];
        ng.send_circ(deck).unwrap();

        assert_eq!(
            *circuit_lines.lock().unwrap(),
            deck.iter().map(|l| l.to_string()).collect::<Vec<_>>()
        );
        // Circuit lines do not take the command path.
        assert!(commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_text_reaches_the_backend_unchanged() {
        let (mut ng, commands, circuit_lines) = recording_connector();
        ng.send_cmd("%%% not a command \t ###").unwrap();
        ng.send_circ(["Q99 ??? garbage ..."]).unwrap();

        assert_eq!(commands.lock().unwrap().as_slice(), ["%%% not a command \t ###"]);
        assert_eq!(circuit_lines.lock().unwrap().as_slice(), ["Q99 ??? garbage ..."]);
    }

    #[test]
    fn test_run_and_quit_are_plain_commands() {
        let (mut ng, commands, _) = recording_connector();
        ng.run().unwrap();
        ng.quit().unwrap();
        assert_eq!(
            commands.lock().unwrap().as_slice(),
            ["run".to_string(), "quit".to_string()]
        );
    }

    #[test]
    fn test_vector_names_are_plot_qualified() {
        let mut backend = RecordingBackend::default();
        backend.plots = vec!["op1".to_string()];
        backend
            .vecs
            .insert("op1".to_string(), vec!["n1".to_string(), "v1#branch".to_string()]);
        let ng = NgSpice::with_backend(Box::new(backend));

        assert_eq!(
            ng.vector_names(None).unwrap(),
            vec!["op1.n1".to_string(), "op1.v1#branch".to_string()]
        );
    }

    #[test]
    fn test_vectors_renames_branch_currents() {
        let mut backend = RecordingBackend::default();
        backend.plots = vec!["op1".to_string()];
        backend
            .vecs
            .insert("op1".to_string(), vec!["n1".to_string(), "v1#branch".to_string()]);
        backend.vectors.insert(
            "op1.n1".to_string(),
            Vector {
                name: "n1".to_string(),
                data: VectorData::Real(vec![10.0]),
            },
        );
        backend.vectors.insert(
            "op1.v1#branch".to_string(),
            Vector {
                name: "v1#branch".to_string(),
                data: VectorData::Real(vec![-1e-3]),
            },
        );
        let ng = NgSpice::with_backend(Box::new(backend));

        let set = ng.vectors(None).unwrap();
        assert_eq!(set.plot, "op1");
        assert_eq!(set.vectors.len(), 2);
        assert_eq!(set.vectors[0].name, "n1");
        assert_eq!(set.vectors[1].name, "i(v1)");
        assert_eq!(set.get("i(v1)").unwrap().data, VectorData::Real(vec![-1e-3]));
    }

    #[test]
    fn test_with_library_bad_path_yields_no_handle() {
        let result = NgSpice::with_library("/nonexistent/libngspice.so");
        assert!(matches!(
            result,
            Err(crate::NgSpiceError::LoadFailed { .. })
        ));
    }
}
