use crate::error::RenderError;
use crate::types::{AdapterProfile, GpuPowerPreference};

/// Headless wgpu device + queue shared by the canvas, texture and programs.
pub struct GpuContext {
    pub(crate) _instance: wgpu::Instance,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    adapter_profile: AdapterProfile,
}

impl GpuContext {
    pub fn headless(gpu_power: GpuPowerPreference) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let power_preference = match gpu_power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|err| RenderError::Gpu(format!("failed to find a suitable GPU adapter: {err}")))?;

        let limits = adapter.limits();
        let adapter_profile = AdapterProfile::from_wgpu(&adapter.get_info(), &limits);
        tracing::debug!(
            name = %adapter_profile.name,
            backend = ?adapter_profile.backend,
            device_type = ?adapter_profile.device_type,
            is_software = adapter_profile.is_software(),
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("cardpreview device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| RenderError::Gpu(format!("failed to create GPU device: {err}")))?;

        Ok(Self {
            _instance: instance,
            device,
            queue,
            adapter_profile,
        })
    }

    pub fn adapter_profile(&self) -> &AdapterProfile {
        &self.adapter_profile
    }

    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> Result<(), RenderError> {
        let max_dimension = self.adapter_profile.max_texture_dimension;
        if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
            return Err(RenderError::InvalidFrame(format!(
                "{width}x{height} is outside the supported range 1..={max_dimension}"
            )));
        }
        Ok(())
    }
}
