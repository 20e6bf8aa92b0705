//! Knobs for the literal constants this system fixes (the consolidated-KB file
//! name, the depth bound used by the skeleton builder, the engine
//! invocation command), kept overridable rather than scattered as magic
//! numbers.

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the consolidated, instrumented KB file.
    pub output_file: String,
    /// Name of the persisted trace file.
    pub trace_file: String,
    /// BFS expansion depth bound for per-fact skeletons.
    pub max_expansion_depth: usize,
    /// Command used to invoke the external inference engine.
    pub engine_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_file: "~xproblog.kb".to_string(),
            trace_file: "~xproblog.out".to_string(),
            max_expansion_depth: 20,
            engine_command: "problog".to_string(),
        }
    }
}

#[cfg(feature = "config-file")]
impl Config {
    /// Load a `Config` from a TOML file, falling back to [`Config::default`]
    /// for any field the file omits.
    pub fn load(path: impl AsRef<std::path::Path>) -> std::io::Result<Config> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
