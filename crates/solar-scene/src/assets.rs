//! Surface bindings and background image decoding.
//!
//! [`SurfaceRegistry`] hands out a [`SurfaceHandle`] per image immediately, in
//! the [`SurfaceState::Placeholder`] state, so bodies can be built and drawn
//! before any pixels exist. [`AssetLoader`] decodes images on a worker thread
//! and posts [`AssetMessage`]s back over a channel; the update thread drains
//! them once per frame and applies them to the registry. Nothing else in the
//! scene is touched from the worker.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crate::error::SceneError;

/// Opaque reference to one surface image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(usize);

impl SurfaceHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to spawn asset worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("asset loader has shut down")]
    LoaderClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceState {
    /// Drawn as plain white until the image arrives.
    Placeholder,
    Loaded { width: u32, height: u32 },
    /// Decoding failed; the placeholder stays in use.
    Failed { reason: String },
}

#[derive(Debug)]
struct SurfaceEntry {
    name: String,
    path: PathBuf,
    state: SurfaceState,
    pending: Option<DecodedImage>,
}

#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    entries: Vec<SurfaceEntry>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image. The handle is usable right away as a placeholder.
    pub fn register(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> SurfaceHandle {
        let handle = SurfaceHandle(self.entries.len());
        self.entries.push(SurfaceEntry {
            name: name.into(),
            path: path.into(),
            state: SurfaceState::Placeholder,
            pending: None,
        });
        handle
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = SurfaceHandle> + '_ {
        (0..self.entries.len()).map(SurfaceHandle)
    }

    pub fn name(&self, handle: SurfaceHandle) -> Option<&str> {
        self.entries.get(handle.0).map(|e| e.name.as_str())
    }

    pub fn path(&self, handle: SurfaceHandle) -> Option<&Path> {
        self.entries.get(handle.0).map(|e| e.path.as_path())
    }

    pub fn state(&self, handle: SurfaceHandle) -> Option<&SurfaceState> {
        self.entries.get(handle.0).map(|e| &e.state)
    }

    /// Record a finished decode. Successful images wait in the registry until
    /// [`take_dirty`](Self::take_dirty) hands them to the renderer.
    pub fn complete(
        &mut self,
        handle: SurfaceHandle,
        result: Result<DecodedImage, AssetError>,
    ) -> Result<(), SceneError> {
        let entry = self
            .entries
            .get_mut(handle.0)
            .ok_or(SceneError::UnknownSurface(handle.0))?;
        match result {
            Ok(image) => {
                tracing::debug!(
                    surface = %entry.name,
                    width = image.width,
                    height = image.height,
                    "Surface decoded"
                );
                entry.state = SurfaceState::Loaded {
                    width: image.width,
                    height: image.height,
                };
                entry.pending = Some(image);
            }
            Err(e) => {
                tracing::warn!(surface = %entry.name, "Keeping placeholder: {e}");
                entry.state = SurfaceState::Failed {
                    reason: e.to_string(),
                };
                entry.pending = None;
            }
        }
        Ok(())
    }

    /// Images decoded since the last call, ready for GPU upload.
    pub fn take_dirty(&mut self) -> Vec<(SurfaceHandle, DecodedImage)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(i, e)| e.pending.take().map(|img| (SurfaceHandle(i), img)))
            .collect()
    }
}

/// A finished decode posted by the worker thread.
#[derive(Debug)]
pub struct AssetMessage {
    pub surface: SurfaceHandle,
    pub result: Result<DecodedImage, AssetError>,
}

struct LoadRequest {
    surface: SurfaceHandle,
    path: PathBuf,
}

/// Background image decoder.
pub struct AssetLoader {
    request_sender: Option<crossbeam_channel::Sender<LoadRequest>>,
    result_receiver: crossbeam_channel::Receiver<AssetMessage>,
    /// Set on shutdown; the worker drops queued requests once it sees it.
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AssetLoader {
    pub fn new() -> Result<Self, AssetError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);

        let worker = std::thread::Builder::new()
            .name("solar-assets".to_string())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    if worker_cancelled.load(Ordering::Acquire) {
                        break;
                    }
                    let result = decode_image(&request.path);
                    if result_tx
                        .send(AssetMessage {
                            surface: request.surface,
                            result,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            })
            .map_err(AssetError::Spawn)?;

        Ok(Self {
            request_sender: Some(request_tx),
            result_receiver: result_rx,
            cancelled,
            worker: Some(worker),
        })
    }

    /// Queue a decode. Returns immediately.
    pub fn request(
        &self,
        surface: SurfaceHandle,
        path: impl Into<PathBuf>,
    ) -> Result<(), AssetError> {
        let sender = self.request_sender.as_ref().ok_or(AssetError::LoaderClosed)?;
        sender
            .send(LoadRequest {
                surface,
                path: path.into(),
            })
            .map_err(|_| AssetError::LoaderClosed)
    }

    /// Queue every surface still showing its placeholder.
    pub fn request_all(&self, registry: &SurfaceRegistry) -> Result<usize, AssetError> {
        let mut queued = 0;
        for handle in registry.handles() {
            if registry.state(handle) != Some(&SurfaceState::Placeholder) {
                continue;
            }
            if let Some(path) = registry.path(handle) {
                self.request(handle, path)?;
                queued += 1;
            }
        }
        tracing::info!("Queued {queued} images for decoding");
        Ok(queued)
    }

    /// Completed decodes. Called once per frame on the update thread.
    pub fn drain(&self) -> Vec<AssetMessage> {
        self.result_receiver.try_iter().collect()
    }

    /// Stop accepting requests and wait for the worker to exit. Queued
    /// requests are discarded; at most the decode in progress completes.
    pub fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.request_sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Decode any format the `image` crate recognizes into RGBA8.
pub fn decode_image(path: &Path) -> Result<DecodedImage, AssetError> {
    let image = image::open(path)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();
        path
    }

    fn drain_until(loader: &AssetLoader, count: usize) -> Vec<AssetMessage> {
        let start = Instant::now();
        let mut messages = Vec::new();
        while messages.len() < count && start.elapsed() < Duration::from_secs(5) {
            messages.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        messages
    }

    #[test]
    fn test_register_starts_as_placeholder() {
        let mut registry = SurfaceRegistry::new();
        let handle = registry.register("SunT.jpeg", "textures/SunT.jpeg");
        assert_eq!(registry.state(handle), Some(&SurfaceState::Placeholder));
        assert_eq!(registry.name(handle), Some("SunT.jpeg"));
        assert!(registry.take_dirty().is_empty());
    }

    #[test]
    fn test_complete_success_marks_dirty_once() {
        let mut registry = SurfaceRegistry::new();
        let handle = registry.register("EarthT.png", "EarthT.png");
        let image = DecodedImage {
            width: 2,
            height: 1,
            rgba: vec![255; 8],
        };
        registry.complete(handle, Ok(image.clone())).unwrap();

        assert_eq!(
            registry.state(handle),
            Some(&SurfaceState::Loaded {
                width: 2,
                height: 1
            })
        );
        assert_eq!(registry.take_dirty(), vec![(handle, image)]);
        assert!(registry.take_dirty().is_empty());
    }

    #[test]
    fn test_complete_failure_keeps_placeholder_pixels() {
        let mut registry = SurfaceRegistry::new();
        let handle = registry.register("MarsT.jpeg", "missing/MarsT.jpeg");
        registry
            .complete(handle, Err(AssetError::LoaderClosed))
            .unwrap();
        assert!(matches!(
            registry.state(handle),
            Some(SurfaceState::Failed { .. })
        ));
        assert!(registry.take_dirty().is_empty());
    }

    #[test]
    fn test_complete_unknown_handle() {
        let mut registry = SurfaceRegistry::new();
        assert_eq!(
            registry.complete(SurfaceHandle(3), Err(AssetError::LoaderClosed)),
            Err(SceneError::UnknownSurface(3))
        );
    }

    #[test]
    fn test_decode_image_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "tiny.png", 3, 2);
        let decoded = decode_image(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_loader_delivers_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 4, 4);
        let mut registry = SurfaceRegistry::new();
        let good_handle = registry.register("good.png", good);
        let bad_handle = registry.register("bad.png", dir.path().join("bad.png"));

        let loader = AssetLoader::new().unwrap();
        assert_eq!(loader.request_all(&registry).unwrap(), 2);

        let messages = drain_until(&loader, 2);
        assert_eq!(messages.len(), 2);
        for message in messages {
            let ok = message.result.is_ok();
            registry.complete(message.surface, message.result).unwrap();
            assert_eq!(ok, message.surface == good_handle);
        }
        assert!(matches!(
            registry.state(bad_handle),
            Some(SurfaceState::Failed { .. })
        ));
        assert_eq!(registry.take_dirty().len(), 1);
    }

    #[test]
    fn test_request_after_shutdown_fails() {
        let mut loader = AssetLoader::new().unwrap();
        loader.shutdown();
        assert!(matches!(
            loader.request(SurfaceHandle(0), "x.png"),
            Err(AssetError::LoaderClosed)
        ));
    }

    #[test]
    fn test_shutdown_discards_queued_requests() {
        let mut loader = AssetLoader::new().unwrap();
        loader.cancelled.store(true, Ordering::Release);
        for i in 0..50 {
            loader
                .request(SurfaceHandle(i), format!("missing-{i}.png"))
                .unwrap();
        }
        loader.shutdown();
        assert!(loader.drain().is_empty());
        assert!(loader.worker.is_none());
    }
}
