// src/scrape/sources/mod.rs
pub mod koto;
pub mod pentagram;

use crate::scrape::types::ProjectSource;

/// The fixed production registry. Order here is the concatenation
/// order of every batch.
pub fn default_sources() -> Vec<Box<dyn ProjectSource>> {
    vec![
        Box::new(koto::KotoSource::from_url(koto::WORK_URL)),
        Box::new(pentagram::PentagramSource::from_url(
            pentagram::ARTS_CULTURE_URL,
        )),
    ]
}
