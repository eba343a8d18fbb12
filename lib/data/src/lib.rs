pub mod cache;
pub mod debounce;
pub mod decode;
pub mod filters;
pub mod source;

pub use cache::{OptionCache, PageCache, PageData, option_key, page_key};
pub use debounce::Debouncer;
pub use decode::Payload;
pub use filters::{FilterDomain, FilterOption, FilterResolver};
pub use source::{FetchPlan, PageSource, PageState};
