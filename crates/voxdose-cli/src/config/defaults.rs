use std::path::PathBuf;

/// Conventional locations used when a path argument is omitted.
///
/// Physical-fluence commands read the project's `setups/setup.json`; the event-scaled
/// commands are run next to the simulation and read `setup.json` from the working directory.
pub struct DefaultsConfig {
    pub project_setup: PathBuf,
    pub simulation_setup: PathBuf,
    pub thermal_prefix: PathBuf,
    pub radiolysis_prefix: PathBuf,
    pub tally_output: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            project_setup: PathBuf::from("setups").join("setup.json"),
            simulation_setup: PathBuf::from("setup.json"),
            thermal_prefix: PathBuf::from("output").join("temp"),
            radiolysis_prefix: PathBuf::from("output").join("radiolysis"),
            tally_output: PathBuf::from("output").join("dose"),
        }
    }
}

/// Which default setup location a command uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupLocation {
    Project,
    Simulation,
}

/// Which default output prefix a command uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Thermal,
    Radiolysis,
    Tally,
}

impl DefaultsConfig {
    pub fn setup_path(&self, location: SetupLocation) -> PathBuf {
        match location {
            SetupLocation::Project => self.project_setup.clone(),
            SetupLocation::Simulation => self.simulation_setup.clone(),
        }
    }

    pub fn output_prefix(&self, kind: OutputKind) -> PathBuf {
        match kind {
            OutputKind::Thermal => self.thermal_prefix.clone(),
            OutputKind::Radiolysis => self.radiolysis_prefix.clone(),
            OutputKind::Tally => self.tally_output.clone(),
        }
    }
}
