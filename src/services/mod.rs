pub mod cancel;
pub mod csv_export;
pub mod enrichment;
pub mod session_gate;
pub mod view_state;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use csv_export::CsvExporter;
pub use enrichment::{EnrichmentPipeline, EnrichmentSession, LookupStats, PipelineEvent, PipelineState};
pub use session_gate::SessionGate;
pub use view_state::{DerivedView, SortDirection, SortKey, ViewController, ViewState};
