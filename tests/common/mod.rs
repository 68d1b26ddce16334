//! Shared test doubles for command integration tests.
//!
//! [`RecordingEngine`] captures submitted jobs instead of running ffmpeg;
//! [`ScriptedLister`] returns a canned device listing or failure.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use dash_av::{DashJob, DeviceLister, Engine};

/// Engine that records every job it receives.
#[derive(Default)]
pub struct RecordingEngine {
    jobs: Mutex<Vec<DashJob>>,
    fail_with: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that records the job and then reports an ffmpeg failure.
    pub fn failing(message: &str) -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn jobs(&self) -> Vec<DashJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for RecordingEngine {
    async fn submit(&self, job: &DashJob) -> dash_av::Result<()> {
        self.jobs.lock().unwrap().push(job.clone());
        match &self.fail_with {
            Some(message) => Err(dash_av::Error::tool_failed("ffmpeg", message.clone())),
            None => Ok(()),
        }
    }
}

/// Device lister with a fixed answer.
pub enum ScriptedLister {
    Output(String),
    Fail(String),
}

impl ScriptedLister {
    pub fn output(listing: &str) -> Self {
        ScriptedLister::Output(listing.to_string())
    }

    pub fn fail(message: &str) -> Self {
        ScriptedLister::Fail(message.to_string())
    }
}

#[async_trait]
impl DeviceLister for ScriptedLister {
    async fn list(&self) -> dash_av::Result<String> {
        match self {
            ScriptedLister::Output(listing) => Ok(listing.clone()),
            ScriptedLister::Fail(message) => Err(dash_av::Error::device_discovery(message.clone())),
        }
    }
}
