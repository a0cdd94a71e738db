//! VAE Model Architecture
//!
//! A dense variational autoencoder built with burn: the encoder maps a
//! flattened image through a Linear stack to mean and log-variance heads,
//! the latent code is drawn with the reparameterization trick, and a
//! mirrored decoder reconstructs the image through a sigmoid output.

use burn::{
    config::Config,
    module::Module,
    nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu},
    tensor::{activation::sigmoid, backend::Backend, Distribution, Tensor},
};

/// Configuration for the disk VAE
#[derive(Config, Debug)]
pub struct DiskVaeConfig {
    /// Input image size (assumes square images)
    pub img_dim: usize,

    /// Number of input channels
    pub channels: usize,

    /// Latent space dimensionality
    #[config(default = "16")]
    pub latent_dim: usize,

    /// Encoder hidden layer widths (decoder mirrors them)
    #[config(default = "vec![512, 128]")]
    pub hidden: Vec<usize>,

    /// Dropout rate applied between encoder layers
    #[config(default = "0.2")]
    pub dropout: f64,
}

impl DiskVaeConfig {
    /// Initialize the model on the given device
    pub fn init<B: Backend>(&self, device: &B::Device) -> DiskVae<B> {
        let in_features = self.channels * self.img_dim * self.img_dim;

        let mut encoder = Vec::with_capacity(self.hidden.len());
        let mut prev = in_features;
        for &width in &self.hidden {
            encoder.push(LinearConfig::new(prev, width).init(device));
            prev = width;
        }

        let fc_mu = LinearConfig::new(prev, self.latent_dim).init(device);
        let fc_logvar = LinearConfig::new(prev, self.latent_dim).init(device);

        let mut decoder = Vec::with_capacity(self.hidden.len());
        let mut prev = self.latent_dim;
        for &width in self.hidden.iter().rev() {
            decoder.push(LinearConfig::new(prev, width).init(device));
            prev = width;
        }

        let out = LinearConfig::new(prev, in_features).init(device);

        DiskVae {
            encoder,
            fc_mu,
            fc_logvar,
            decoder,
            out,
            dropout: DropoutConfig::new(self.dropout).init(),
            activation: Relu::new(),
            img_dim: self.img_dim,
            channels: self.channels,
            latent_dim: self.latent_dim,
        }
    }
}

/// Output of one forward pass
#[derive(Debug, Clone)]
pub struct VaeOutput<B: Backend> {
    /// Reconstructed images, shape [batch, channels, height, width]
    pub reconstruction: Tensor<B, 4>,
    /// Sampled latent codes, shape [batch, latent_dim]
    pub z: Tensor<B, 2>,
    /// Latent means, shape [batch, latent_dim]
    pub mu: Tensor<B, 2>,
    /// Latent log-variances, shape [batch, latent_dim]
    pub logvar: Tensor<B, 2>,
}

/// Dense variational autoencoder for disk images
#[derive(Module, Debug)]
pub struct DiskVae<B: Backend> {
    encoder: Vec<Linear<B>>,
    fc_mu: Linear<B>,
    fc_logvar: Linear<B>,
    decoder: Vec<Linear<B>>,
    out: Linear<B>,
    dropout: Dropout,
    activation: Relu,
    img_dim: usize,
    channels: usize,
    latent_dim: usize,
}

impl<B: Backend> DiskVae<B> {
    /// Encode, sample the latent, and decode
    pub fn forward(&self, x: Tensor<B, 4>) -> VaeOutput<B> {
        let [batch, channels, height, width] = x.dims();

        let mut h = x.flatten::<2>(1, 3);
        for layer in &self.encoder {
            h = self.dropout.forward(self.activation.forward(layer.forward(h)));
        }

        let mu = self.fc_mu.forward(h.clone());
        let logvar = self.fc_logvar.forward(h);
        let z = self.reparameterize(mu.clone(), logvar.clone());

        let mut d = z.clone();
        for layer in &self.decoder {
            d = self.activation.forward(layer.forward(d));
        }
        let reconstruction =
            sigmoid(self.out.forward(d)).reshape([batch, channels, height, width]);

        VaeOutput {
            reconstruction,
            z,
            mu,
            logvar,
        }
    }

    /// z = mu + eps * exp(0.5 * logvar), eps ~ N(0, 1)
    fn reparameterize(&self, mu: Tensor<B, 2>, logvar: Tensor<B, 2>) -> Tensor<B, 2> {
        let std = logvar.mul_scalar(0.5).exp();
        let eps = Tensor::random(std.dims(), Distribution::Normal(0.0, 1.0), &std.device());
        mu + eps * std
    }

    /// Latent space dimensionality
    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    /// Input image side length
    pub fn img_dim(&self) -> usize {
        self.img_dim
    }

    /// Input channel count
    pub fn channels(&self) -> usize {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn small_model() -> DiskVae<TestBackend> {
        DiskVaeConfig::new(8, 1)
            .with_latent_dim(4)
            .with_hidden(vec![32, 16])
            .init(&NdArrayDevice::default())
    }

    #[test]
    fn test_forward_shapes() {
        let model = small_model();
        let x = Tensor::<TestBackend, 4>::zeros([2, 1, 8, 8], &NdArrayDevice::default());

        let out = model.forward(x);
        assert_eq!(out.reconstruction.dims(), [2, 1, 8, 8]);
        assert_eq!(out.mu.dims(), [2, 4]);
        assert_eq!(out.logvar.dims(), [2, 4]);
        assert_eq!(out.z.dims(), [2, 4]);
    }

    #[test]
    fn test_reconstruction_in_unit_range() {
        let model = small_model();
        let x = Tensor::<TestBackend, 4>::random(
            [3, 1, 8, 8],
            Distribution::Uniform(0.0, 1.0),
            &NdArrayDevice::default(),
        );

        let out = model.forward(x);
        let values: Vec<f32> = out.reconstruction.into_data().to_vec().unwrap();
        assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
