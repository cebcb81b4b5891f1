//! Audio device capture and stream management.
//!
//! Handles audio input from system devices using cpal, managing device enumeration,
//! stream creation, and a ring buffer for sample storage.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use auralis_core::{InitError, FFT_SIZE};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};

/// Mono samples kept for analysis; one analyser window.
pub const BUFFER_SIZE: usize = FFT_SIZE;

/// Ring buffer shared between the capture callback and the analysis side.
#[derive(Clone)]
pub struct SampleBuffer {
    samples: Arc<Mutex<VecDeque<f32>>>,
    failed: Arc<AtomicBool>,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        let mut samples = VecDeque::with_capacity(capacity);
        samples.resize(capacity, 0.0);
        Self {
            samples: Arc::new(Mutex::new(samples)),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Appends interleaved frames, downmixed to mono. Oldest samples drop off.
    pub fn push_interleaved(&self, data: &[f32], channels: usize) {
        let Ok(mut buffer) = self.samples.lock() else {
            return;
        };
        let capacity = buffer.len();
        for chunk in data.chunks(channels.max(1)) {
            let sample = chunk.iter().sum::<f32>() / chunk.len() as f32;
            buffer.push_back(sample);
        }
        let excess = buffer.len().saturating_sub(capacity);
        buffer.drain(..excess);
    }

    /// Copies the buffer oldest-first into `out`. None if the lock is poisoned.
    pub fn snapshot(&self, out: &mut Vec<f32>) -> Option<()> {
        let buffer = self.samples.lock().ok()?;
        out.clear();
        out.extend(buffer.iter().copied());
        Some(())
    }

    pub(crate) fn mark_failed(&self) {
        self.failed.store(true, Ordering::Relaxed);
    }

    /// Returns and clears the stream failure flag.
    pub fn take_failure(&self) -> bool {
        self.failed.swap(false, Ordering::Relaxed)
    }
}

pub struct DeviceInfo {
    pub device: cpal::Device,
    pub name: String,
    pub is_input: bool,
}

pub struct SourcePipe {
    buffer: SampleBuffer,
    devices: Vec<DeviceInfo>,
    current_device: usize,
    _stream: Stream,
}

impl SourcePipe {
    /// Opens the remembered device if it is still present, otherwise the
    /// preferred system input.
    pub fn open(last_device: Option<(&str, bool)>, timeout: Duration) -> Result<Self, InitError> {
        let devices = Self::collect_devices();
        if devices.is_empty() {
            return Err(InitError::NoAudioDevice);
        }

        let start_index = last_device
            .and_then(|(name, is_input)| {
                devices
                    .iter()
                    .position(|d| d.name == name && d.is_input == is_input)
            })
            .or_else(|| {
                // Prefer pipewire or pulse input devices (more reliable on Linux)
                devices
                    .iter()
                    .position(|d| d.is_input && d.name == "pipewire")
            })
            .or_else(|| devices.iter().position(|d| d.is_input && d.name == "pulse"))
            .or_else(|| {
                let host = cpal::default_host();
                let default_input = host.default_input_device().and_then(|d| d.name().ok());
                default_input.and_then(|name| devices.iter().position(|d| d.is_input && d.name == name))
            })
            .unwrap_or(0);

        let buffer = SampleBuffer::new(BUFFER_SIZE);
        let stream = Self::build_stream(&devices[start_index], buffer.clone(), timeout)?;

        let info = &devices[start_index];
        log::info!("[{}] Selected: {} ({})", start_index, info.name, device_type(info));

        Ok(Self {
            buffer,
            devices,
            current_device: start_index,
            _stream: stream,
        })
    }

    pub fn list_devices() {
        log::info!("=== Audio Devices ===");
        for (idx, info) in Self::collect_devices().iter().enumerate() {
            log::info!("  [{}] {} ({})", idx, info.name, device_type(info));
        }
    }

    fn collect_devices() -> Vec<DeviceInfo> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Ok(input_devices) = host.input_devices() {
            for device in input_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: true,
                    });
                }
            }
        }

        if let Ok(output_devices) = host.output_devices() {
            for device in output_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: false,
                    });
                }
            }
        }

        devices
    }

    /// Get device config with timeout (the config call often hangs on bad devices)
    fn config_with_timeout(info: &DeviceInfo, timeout: Duration) -> Result<StreamConfig, InitError> {
        let device: Device = info.device.clone();
        let is_input = info.is_input;
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device.default_input_config()
            } else {
                device.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(config)) => Ok(config.into()),
            Ok(Err(e)) => Err(InitError::DeviceConfig {
                device: info.name.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(InitError::DeviceConfig {
                device: info.name.clone(),
                reason: format!("timed out after {:?}", timeout),
            }),
        }
    }

    fn build_stream(info: &DeviceInfo, buffer: SampleBuffer, timeout: Duration) -> Result<Stream, InitError> {
        let stream_config = Self::config_with_timeout(info, timeout)?;
        let channels = stream_config.channels as usize;
        let stream_err = |reason: String| InitError::StreamBuild {
            device: info.name.clone(),
            reason,
        };

        let error_buffer = buffer.clone();
        let stream = info
            .device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    buffer.push_interleaved(data, channels);
                },
                move |err| {
                    log::warn!("Audio stream error: {}", err);
                    error_buffer.mark_failed();
                },
                None,
            )
            .map_err(|e| stream_err(e.to_string()))?;

        stream.play().map_err(|e| stream_err(e.to_string()))?;
        Ok(stream)
    }

    pub fn current_device(&self) -> &DeviceInfo {
        &self.devices[self.current_device]
    }

    pub fn buffer(&self) -> SampleBuffer {
        self.buffer.clone()
    }
}

fn device_type(info: &DeviceInfo) -> &'static str {
    if info.is_input {
        "input"
    } else {
        "output"
    }
}
