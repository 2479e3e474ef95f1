use clap::ValueEnum;

/// How a decoded certificate is rendered to the output sink.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderFormat {
    /// Multi-line descriptive text
    #[default]
    Human,
    /// One JSON object per certificate, one per line
    Json,
}
