//! Frame source and sink boundaries
//!
//! Analysis reads frames sequentially from a `FrameSource` and writes the
//! annotated copies, in the same order and dimensions, to a `FrameSink`.
//! The bundled implementations store a video as a directory of numbered
//! image files plus a `sequence.json` manifest carrying the frame rate.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};

/// Manifest file written next to the frames
pub const SEQUENCE_MANIFEST: &str = "sequence.json";

/// Frame rate assumed when a sequence has no manifest
pub const DEFAULT_FPS: f64 = 30.0;

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Stream-level properties of a video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Frames per second
    pub fps: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Total frame count reported by the container
    pub frame_count: u64,
}

impl VideoMetadata {
    /// Reported duration, zero when the frame rate is unknown
    pub fn duration_seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_count as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// One decoded video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// 0-based position in the stream
    pub index: u64,
    pub image: RgbImage,
}

/// Pulls frames from a video in order
pub trait FrameSource {
    fn metadata(&self) -> &VideoMetadata;

    /// Next frame, or `None` at end of stream
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Accepts annotated frames in call order
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and close the output; called once whether the run completed or aborted
    fn finish(&mut self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SequenceManifest {
    fps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame_count: Option<u64>,
}

fn is_frame_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
}

fn is_sink_output(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name == SEQUENCE_MANIFEST || (name.starts_with("frame_") && name.ends_with(".png"))
}

/// Delete frames and manifest written by an earlier sink, returning the frame count
fn remove_previous_output(dir: &Path) -> Result<usize> {
    let sink_err = |e: std::io::Error| AnalysisError::Sink(format!("{}: {}", dir.display(), e));

    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(sink_err)? {
        let path = entry.map_err(sink_err)?.path();
        if path.is_file() && is_sink_output(&path) {
            fs::remove_file(&path).map_err(sink_err)?;
            if path.file_name().and_then(|n| n.to_str()) != Some(SEQUENCE_MANIFEST) {
                removed += 1;
            }
        }
    }
    Ok(removed)
}

/// Reads a directory of numbered frame images
#[derive(Debug)]
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    metadata: VideoMetadata,
    next_index: usize,
}

impl ImageSequenceSource {
    /// Open a frame directory
    ///
    /// Fails with `AnalysisError::Open` when the directory cannot be read,
    /// holds no frames, or has an unreadable manifest or first frame.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let open_err = |reason: String| AnalysisError::Open {
            path: dir.to_path_buf(),
            reason,
        };

        let entries = fs::read_dir(dir).map_err(|e| open_err(e.to_string()))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_frame_file(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(open_err("no frames found".to_string()));
        }

        let manifest_path = dir.join(SEQUENCE_MANIFEST);
        let fps = if manifest_path.exists() {
            let contents =
                fs::read_to_string(&manifest_path).map_err(|e| open_err(e.to_string()))?;
            let manifest: SequenceManifest = serde_json::from_str(&contents)
                .map_err(|e| open_err(format!("invalid {}: {}", SEQUENCE_MANIFEST, e)))?;
            manifest.fps
        } else {
            DEFAULT_FPS
        };

        let (width, height) =
            image::image_dimensions(&files[0]).map_err(|e| open_err(e.to_string()))?;

        let metadata = VideoMetadata {
            fps,
            width,
            height,
            frame_count: files.len() as u64,
        };

        tracing::debug!(
            "Opened frame sequence {} ({}x{}, {} frames at {} fps)",
            dir.display(),
            width,
            height,
            metadata.frame_count,
            fps
        );

        Ok(Self {
            files,
            metadata,
            next_index: 0,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.get(self.next_index) else {
            return Ok(None);
        };
        let index = self.next_index as u64;

        let image = image::open(path)
            .map_err(|e| AnalysisError::Decode {
                index,
                reason: e.to_string(),
            })?
            .to_rgb8();

        if image.dimensions() != (self.metadata.width, self.metadata.height) {
            return Err(AnalysisError::Decode {
                index,
                reason: format!(
                    "frame is {}x{}, expected {}x{}",
                    image.width(),
                    image.height(),
                    self.metadata.width,
                    self.metadata.height
                ),
            });
        }

        self.next_index += 1;
        Ok(Some(Frame { index, image }))
    }
}

/// Writes annotated frames as PNG files plus a manifest
#[derive(Debug)]
pub struct ImageSequenceSink {
    dir: PathBuf,
    metadata: VideoMetadata,
    frames_written: u64,
    finished: bool,
}

impl ImageSequenceSink {
    /// Create the output directory, or truncate a previous sequence in it
    ///
    /// Frames and the manifest left by an earlier run are removed so the
    /// directory only ever holds the current run's output. Other files are
    /// left alone.
    pub fn create<P: AsRef<Path>>(dir: P, metadata: &VideoMetadata) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            AnalysisError::Sink(format!("cannot create {}: {}", dir.display(), e))
        })?;
        let removed = remove_previous_output(&dir)?;
        if removed > 0 {
            tracing::info!(
                "Replaced {} frames from a previous run in {}",
                removed,
                dir.display()
            );
        }

        Ok(Self {
            dir,
            metadata: *metadata,
            frames_written: 0,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl FrameSink for ImageSequenceSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.finished {
            return Err(AnalysisError::Sink("sink already finished".to_string()));
        }
        if frame.image.dimensions() != (self.metadata.width, self.metadata.height) {
            return Err(AnalysisError::Sink(format!(
                "frame {} is {}x{}, output is {}x{}",
                frame.index,
                frame.image.width(),
                frame.image.height(),
                self.metadata.width,
                self.metadata.height
            )));
        }

        let path = self.dir.join(format!("frame_{:06}.png", frame.index));
        frame
            .image
            .save(&path)
            .map_err(|e| AnalysisError::Sink(format!("{}: {}", path.display(), e)))?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let manifest = SequenceManifest {
            fps: self.metadata.fps,
            width: Some(self.metadata.width),
            height: Some(self.metadata.height),
            frame_count: Some(self.frames_written),
        };
        let contents = serde_json::to_string_pretty(&manifest)?;
        fs::write(self.dir.join(SEQUENCE_MANIFEST), contents)?;

        tracing::debug!(
            "Wrote {} annotated frames to {}",
            self.frames_written,
            self.dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::Rgb;

    fn write_frames(dir: &Path, count: usize, width: u32, height: u32) {
        for i in 0..count {
            let img = RgbImage::from_pixel(width, height, Rgb([i as u8, 0, 0]));
            img.save(dir.join(format!("{:04}.png", i))).unwrap();
        }
    }

    #[test]
    fn test_open_missing_directory() {
        let err = ImageSequenceSource::open("/nonexistent/frames").unwrap_err();
        assert_matches!(err, AnalysisError::Open { .. });
        assert!(err.to_string().contains("Could not open video file"));
    }

    #[test]
    fn test_open_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();
        let err = ImageSequenceSource::open(dir.path()).unwrap_err();
        assert_matches!(err, AnalysisError::Open { ref reason, .. } if reason == "no frames found");
    }

    #[test]
    fn test_reads_frames_in_order_with_manifest_fps() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 3, 8, 6);
        fs::write(dir.path().join(SEQUENCE_MANIFEST), r#"{"fps": 25.0}"#).unwrap();

        let mut source = ImageSequenceSource::open(dir.path()).unwrap();
        let meta = *source.metadata();
        assert_eq!(meta.fps, 25.0);
        assert_eq!((meta.width, meta.height), (8, 6));
        assert_eq!(meta.frame_count, 3);

        for expected in 0..3u64 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.index, expected);
            assert_eq!(frame.image.get_pixel(0, 0)[0], expected as u8);
        }
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_default_fps_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 1, 4, 4);
        let source = ImageSequenceSource::open(dir.path()).unwrap();
        assert_eq!(source.metadata().fps, DEFAULT_FPS);
    }

    #[test]
    fn test_mismatched_frame_size_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 1, 4, 4);
        RgbImage::new(5, 5).save(dir.path().join("0001.png")).unwrap();

        let mut source = ImageSequenceSource::open(dir.path()).unwrap();
        assert!(source.next_frame().unwrap().is_some());
        let err = source.next_frame().unwrap_err();
        assert_matches!(err, AnalysisError::Decode { index: 1, .. });
    }

    #[test]
    fn test_sink_writes_frames_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("annotated");
        let meta = VideoMetadata {
            fps: 30.0,
            width: 4,
            height: 3,
            frame_count: 2,
        };

        let mut sink = ImageSequenceSink::create(&out, &meta).unwrap();
        for index in 0..2 {
            sink.write_frame(&Frame {
                index,
                image: RgbImage::new(4, 3),
            })
            .unwrap();
        }
        sink.finish().unwrap();

        assert_eq!(sink.frames_written(), 2);
        assert!(out.join("frame_000000.png").exists());
        assert!(out.join("frame_000001.png").exists());

        let reopened = ImageSequenceSource::open(&out).unwrap();
        assert_eq!(*reopened.metadata(), meta);
    }

    #[test]
    fn test_sink_replaces_longer_previous_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("annotated");
        let write_run = |frames: u64| {
            let meta = VideoMetadata {
                fps: 30.0,
                width: 4,
                height: 3,
                frame_count: frames,
            };
            let mut sink = ImageSequenceSink::create(&out, &meta).unwrap();
            for index in 0..frames {
                sink.write_frame(&Frame {
                    index,
                    image: RgbImage::new(4, 3),
                })
                .unwrap();
            }
            sink.finish().unwrap();
        };

        write_run(10);
        fs::write(out.join("notes.txt"), "kept").unwrap();
        write_run(3);

        let reopened = ImageSequenceSource::open(&out).unwrap();
        assert_eq!(reopened.metadata().frame_count, 3);
        assert!(!out.join("frame_000003.png").exists());
        assert!(out.join("notes.txt").exists());
    }

    #[test]
    fn test_sink_rejects_wrong_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let meta = VideoMetadata {
            fps: 30.0,
            width: 4,
            height: 3,
            frame_count: 1,
        };
        let mut sink = ImageSequenceSink::create(dir.path(), &meta).unwrap();
        let err = sink
            .write_frame(&Frame {
                index: 0,
                image: RgbImage::new(2, 2),
            })
            .unwrap_err();
        assert_matches!(err, AnalysisError::Sink(_));
    }

    #[test]
    fn test_duration() {
        let meta = VideoMetadata {
            fps: 30.0,
            width: 1,
            height: 1,
            frame_count: 90,
        };
        assert_eq!(meta.duration_seconds(), 3.0);
        assert_eq!(VideoMetadata { fps: 0.0, ..meta }.duration_seconds(), 0.0);
    }
}
