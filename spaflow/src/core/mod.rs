//! Core value types: resolved nodes, the data model and responses.

mod model;
mod node;
mod response;

pub use model::SpaDataModel;
pub use node::{ContentNode, DomainMatch, RedirectTarget};
pub use response::{ResponseBody, SpaResponse};
