//! clonescore - pairwise source code similarity
//!
//! Scores how similar two source files are:
//! 1. [`lexer`] turns each file into a normalized token stream
//! 2. [`pairing`] joins the two streams into one feature string
//! 3. [`vectorizer`] maps the string to a numeric row
//! 4. [`classifier`] turns the row into a score and a verdict
//!
//! [`pipeline::predict_similarity`] runs all four stages for two files.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod lexer;
pub mod model;
pub mod models;
pub mod pairing;
pub mod pipeline;
pub mod reporters;
pub mod vectorizer;

pub use classifier::{Classifier, SimilarityResult, SIMILARITY_THRESHOLD};
pub use lexer::{JavaTokenizer, LabelStyle, TokenStream, Tokenizer};
pub use model::{ModelArtifacts, ModelError};
pub use pairing::{encode_pair, PairedFeatures};
pub use pipeline::{predict_similarity, InputError, SimilarityPipeline};
