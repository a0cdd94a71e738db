//! VAE loss
//!
//! Total loss is the mean-squared reconstruction error plus a beta-weighted
//! KL divergence between the latent posterior and a unit Gaussian. The KL
//! term is a raw sum over both batch and latent dimensions, so its magnitude
//! grows with batch size while the MSE term is a mean.

use burn::nn::loss::{MseLoss, Reduction};
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};

/// Scalar loss components for one batch
#[derive(Debug, Clone, Copy)]
pub struct LossTerms {
    /// Reconstruction + beta * divergence
    pub total: f64,
    /// Mean-squared reconstruction error
    pub reconstruction: f64,
    /// Unweighted KL divergence (raw sum)
    pub divergence: f64,
}

/// Compute the beta-weighted VAE loss for a batch.
///
/// Returns the differentiable total alongside the detached scalar terms
/// used for history tracking.
pub fn vae_loss<B: Backend>(
    reconstruction: Tensor<B, 4>,
    target: Tensor<B, 4>,
    mu: Tensor<B, 2>,
    logvar: Tensor<B, 2>,
    beta: f64,
) -> (Tensor<B, 1>, LossTerms) {
    let mse = MseLoss::new().forward(reconstruction, target, Reduction::Mean);

    // KLD = -0.5 * sum(1 + logvar - mu^2 - exp(logvar))
    let kld = (logvar.clone().add_scalar(1.0) - mu.powf_scalar(2.0) - logvar.exp())
        .sum()
        .mul_scalar(-0.5);

    let total = mse.clone() + kld.clone().mul_scalar(beta);

    let terms = LossTerms {
        total: total.clone().into_scalar().elem::<f64>(),
        reconstruction: mse.into_scalar().elem::<f64>(),
        divergence: kld.into_scalar().elem::<f64>(),
    };

    (total, terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    fn device() -> NdArrayDevice {
        NdArrayDevice::default()
    }

    #[test]
    fn test_standard_normal_posterior_has_zero_divergence() {
        let recon = Tensor::<TestBackend, 4>::zeros([2, 1, 2, 2], &device());
        let target = Tensor::<TestBackend, 4>::zeros([2, 1, 2, 2], &device());
        let mu = Tensor::<TestBackend, 2>::zeros([2, 3], &device());
        let logvar = Tensor::<TestBackend, 2>::zeros([2, 3], &device());

        let (_, terms) = vae_loss(recon, target, mu, logvar, 1.0);
        assert_eq!(terms.total, 0.0);
        assert_eq!(terms.reconstruction, 0.0);
        assert_eq!(terms.divergence, 0.0);
    }

    #[test]
    fn test_beta_weights_divergence() {
        let recon = Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device());
        let target = Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device());
        let mu = Tensor::<TestBackend, 2>::from_floats(
            TensorData::new(vec![1.0f32, -1.0], [1, 2]),
            &device(),
        );
        let logvar = Tensor::<TestBackend, 2>::zeros([1, 2], &device());

        // KLD = -0.5 * sum(1 + 0 - 1 - 1) = 1.0
        let (_, half) = vae_loss(
            recon.clone(),
            target.clone(),
            mu.clone(),
            logvar.clone(),
            0.5,
        );
        let (_, full) = vae_loss(recon, target, mu, logvar, 1.0);

        assert!((half.divergence - 1.0).abs() < 1e-6);
        assert!((full.divergence - 1.0).abs() < 1e-6);
        assert!((half.total - 0.5).abs() < 1e-6);
        assert!((full.total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reconstruction_error_is_mean_squared() {
        let recon = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device());
        let target = Tensor::<TestBackend, 4>::zeros([1, 1, 2, 2], &device());
        let mu = Tensor::<TestBackend, 2>::zeros([1, 2], &device());
        let logvar = Tensor::<TestBackend, 2>::zeros([1, 2], &device());

        let (_, terms) = vae_loss(recon, target, mu, logvar, 1.0);
        assert!((terms.reconstruction - 1.0).abs() < 1e-6);
    }
}
