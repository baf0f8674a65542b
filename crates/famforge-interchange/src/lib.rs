// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! famforge Interchange - JSON implementations of the famforge collaborators
//!
//! Native authoring and target formats stay behind the traits in
//! `famforge-model`. This crate implements them over a plain JSON layout so
//! the pipeline can run end to end:
//!
//! - [`JsonSourceReader`] - reads `famforge-source` files
//! - [`JsonDocumentWriter`] - builds documents in memory, saves them as JSON
//! - [`JsonFamilyReader`] - reads saved family documents back
//! - [`PassthroughKernel`] - a kernel that leaves payloads untouched
//!
//! # Example
//!
//! ```ignore
//! use famforge_interchange::JsonSourceReader;
//! use famforge_model::SourceFileReader;
//!
//! let reader = JsonSourceReader::new();
//! if reader.can_read(path) {
//!     let doc = reader.open(path)?;
//!     println!("{} elements", doc.element_count());
//! }
//! ```

pub mod error;
pub mod format;
mod kernel;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use format::{SourceFile, StoredDocument, StoredElement, DOCUMENT_FORMAT, SOURCE_FORMAT};
pub use kernel::PassthroughKernel;
pub use reader::{
    JsonFamilyReader, JsonSourceReader, FAMILY_EXTENSION, PROJECT_EXTENSION, SOURCE_EXTENSION,
};
pub use writer::JsonDocumentWriter;
