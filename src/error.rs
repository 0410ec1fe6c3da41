pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("style tag must not be blank")]
    BlankStyleTag,

    #[error("sprite name must not be blank")]
    BlankSpriteName,

    #[error("sprite scale must be a positive number, got {scale}")]
    InvalidSpriteScale { scale: f64 },

    #[error("image sprite url `{url}` must use the http or https scheme")]
    InvalidImageScheme { url: String },

    #[error("image sprite url `{url}` must end with one of: {allowed}")]
    InvalidImageExtension { url: String, allowed: String },

    #[error(
        "sprite include `{path}` must be a stdlib reference like `<awslib/Compute/EC2>` or an http(s) url ending in .puml"
    )]
    InvalidSpriteInclude { path: String },

    #[error("property header has {len} columns, at most {max} are allowed")]
    TooManyHeaderColumns { len: usize, max: usize },

    #[error("property row {row} has {len} columns, at most {max} are allowed")]
    TooManyRowColumns { row: usize, len: usize, max: usize },

    #[error("property row {row} has {len} columns but the header only has {header}")]
    RowExceedsHeader { row: usize, len: usize, header: usize },

    #[error(
        "view `{view}` is a dynamic view: dependency configuration #{index} must not set a mode"
    )]
    DynamicViewMode { view: String, index: usize },

    #[error("no parallel sequence is open")]
    NoParallelSequence,
}
