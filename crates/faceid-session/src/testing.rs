//! In-memory collaborators for session tests.

use crate::http::{HttpClient, HttpResponse, RequestDescriptor, TransportError};
use async_trait::async_trait;
use faceid_core::{Descriptor, DescriptorExtractor, ExtractorError};
use faceid_media::{CameraError, CameraStream, Frame, MediaSource};
use image::DynamicImage;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A 4x4 PNG, enough for `image::load_from_memory`.
pub fn png_bytes() -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::new_rgb8(4, 4)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// One scripted `detect` result.
#[derive(Debug, Clone)]
pub enum Script {
    Face(Vec<f32>),
    NoFace,
    Fault,
}

/// Extractor replaying a fixed script; once exhausted it reports no face.
pub struct FakeExtractor {
    script: Mutex<VecDeque<Script>>,
    fail_load: AtomicBool,
    loads: AtomicUsize,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Duration,
}

impl FakeExtractor {
    pub fn new(script: Vec<Script>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fail_load: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failing_load(self) -> Self {
        self.fail_load.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn push(&self, step: Script) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptorExtractor for FakeExtractor {
    async fn load_models(&self, model_dir: &str) -> Result<(), ExtractorError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(ExtractorError::ModelNotFound(model_dir.to_string()));
        }
        Ok(())
    }

    async fn detect(&self, _image: &DynamicImage) -> Result<Option<Descriptor>, ExtractorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Script::NoFace);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match step {
            Script::Face(values) => Ok(Some(Descriptor::new(values))),
            Script::NoFace => Ok(None),
            Script::Fault => Err(ExtractorError::InferenceFailed("scripted fault".into())),
        }
    }
}

/// Media source handing out streams that track their own liveness.
#[derive(Clone, Default)]
pub struct FakeMedia {
    deny: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        let media = Self::default();
        media.deny.store(true, Ordering::SeqCst);
        media
    }

    /// Number of camera grants requested.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of granted streams not yet stopped.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn active_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.active)
    }
}

struct FakeStream {
    active: Arc<AtomicUsize>,
    live: bool,
    sequence: u32,
}

#[async_trait]
impl CameraStream for FakeStream {
    async fn next_frame(&mut self) -> Result<Frame, CameraError> {
        self.sequence += 1;
        Ok(Frame::new(DynamicImage::new_rgb8(1, 1), self.sequence))
    }

    fn stop_all_tracks(&mut self) {
        if std::mem::replace(&mut self.live, false) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl MediaSource for FakeMedia {
    async fn request_camera_stream(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.deny.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }
        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            active: Arc::clone(&self.active),
            live: true,
            sequence: 0,
        }))
    }
}

struct Route {
    status: u16,
    body: Vec<u8>,
    delay: Duration,
}

/// HTTP client answering from a fixed route table; unknown URLs fail at
/// the transport level.
#[derive(Default)]
pub struct FakeHttp {
    routes: HashMap<String, Route>,
    log: Mutex<Vec<RequestDescriptor>>,
    methods: Mutex<Vec<String>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, status: u16, body: Vec<u8>) -> Self {
        self.route_delayed(url, status, body, Duration::ZERO)
    }

    pub fn route_delayed(mut self, url: &str, status: u16, body: Vec<u8>, delay: Duration) -> Self {
        self.routes.insert(url.to_string(), Route { status, body, delay });
        self
    }

    /// `(method, url)` for every request issued, in order.
    pub fn requests(&self) -> Vec<(String, String)> {
        let methods = self.methods.lock().unwrap();
        let log = self.log.lock().unwrap();
        methods
            .iter()
            .zip(log.iter())
            .map(|(m, r)| (m.clone(), r.url.clone()))
            .collect()
    }

    pub fn bodies(&self) -> Vec<Option<String>> {
        self.log.lock().unwrap().iter().map(|r| r.body.clone()).collect()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn send(
        &self,
        method: &str,
        request: &RequestDescriptor,
    ) -> Result<HttpResponse, TransportError> {
        self.methods.lock().unwrap().push(method.to_string());
        self.log.lock().unwrap().push(request.clone());

        let route = self
            .routes
            .get(&request.url)
            .ok_or_else(|| TransportError::Request(format!("connection refused: {}", request.url)))?;
        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }
        Ok(HttpResponse {
            status: route.status,
            body: route.body.clone(),
        })
    }
}
