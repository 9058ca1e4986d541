//! Campaign data: columnar tables, parameter schemas, the experimental
//! reference and the files they are exchanged through.

pub mod corpus;
pub mod csv;
pub mod history;
pub mod params;
pub mod reference;
pub mod table;

pub use corpus::{broadcast, distinct_settings, fuse, Corpus, TrainingRecord};
pub use history::{read_history, write_history};
pub use params::{display_name, ParamSpec, ParameterSchema, ParameterVector};
pub use reference::{euler_fields, grains_in, Reference};
pub use table::{Column, Fields, Table};
