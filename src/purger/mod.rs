pub mod extension_purger;

pub use extension_purger::{ExtensionPurger, PurgeReport, PURGE_EXTENSION};
