//! Backend selection for burn
//!
//! CPU (NdArray) by default; the `wgpu` cargo feature switches training to a
//! GPU compute backend. The autodiff wrapper is applied on top in either case.

use burn::backend::Autodiff;

#[cfg(feature = "wgpu")]
pub type DefaultBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type DefaultBackend = burn::backend::NdArray;

/// The default autodiff backend for training
pub type TrainingBackend = Autodiff<DefaultBackend>;

/// Get the default device for the selected backend
pub fn default_device() -> <DefaultBackend as burn::tensor::backend::Backend>::Device {
    #[cfg(feature = "wgpu")]
    {
        burn::backend::wgpu::WgpuDevice::default()
    }

    #[cfg(not(feature = "wgpu"))]
    {
        burn::backend::ndarray::NdArrayDevice::default()
    }
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "wgpu")]
    {
        "wgpu (GPU)"
    }

    #[cfg(not(feature = "wgpu"))]
    {
        "ndarray (CPU)"
    }
}
