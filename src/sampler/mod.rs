pub mod row_sampler;
pub mod row_table;

pub use row_sampler::{RowSampler, SampleReport, SamplingPolicy};
pub use row_table::{Row, RowTable};
