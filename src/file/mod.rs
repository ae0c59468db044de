//! File storage module for eforice.
//!
//! - Folder and file metadata repositories
//! - Storage classes
//! - The upload directory holding file content

mod folder;
mod metadata;
mod storage;
mod storage_class;

pub use folder::{Folder, FolderRepository, NewFolder};
pub use metadata::{FileMetadata, FileRepository, NewFile};
pub use storage::UploadStorage;
pub use storage_class::{StorageClass, StorageClassRepository};
