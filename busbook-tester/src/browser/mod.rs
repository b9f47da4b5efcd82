pub mod page;
pub mod session;

pub use page::DetailPage;
pub use session::{BrowserConfig, BrowserKind, new_session};
