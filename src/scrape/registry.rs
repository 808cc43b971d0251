// src/scrape/registry.rs
//! Explicit mapping from platform to adapter. The enable order here is the
//! aggregation order of the combined candidate list, so it is fixed:
//! Devpost, MLH, Unstop.

use reqwest::Client;

use crate::config::PlatformsConfig;
use crate::scrape::sources::{devpost::DevpostSource, mlh::MlhSource, unstop::UnstopSource};
use crate::scrape::types::{EventSource, Platform};

pub fn build_sources(platforms: &PlatformsConfig, client: &Client) -> Vec<Box<dyn EventSource>> {
    let mut sources: Vec<Box<dyn EventSource>> = Vec::new();
    for platform in Platform::ALL {
        if !platforms.is_enabled(platform) {
            continue;
        }
        match platform {
            Platform::Devpost => sources.push(Box::new(DevpostSource::new(client.clone()))),
            Platform::Mlh => sources.push(Box::new(MlhSource::new(client.clone()))),
            Platform::Unstop => sources.push(Box::new(UnstopSource::new(client.clone()))),
        }
    }
    sources
}
