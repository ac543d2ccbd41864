//! A ConvNeXt-style hierarchical convolutional classifier.

use crate::common::*;

/// Layer normalization over the channel dimension of `[N, C, H, W]` data.
#[derive(Debug)]
pub struct ChannelNorm {
    ws: Tensor,
    bs: Tensor,
    dim: i64,
    eps: f64,
}

impl ChannelNorm {
    pub fn new<'p, P>(path: P, dim: i64, eps: f64) -> Self
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let ws = path.var("weight", &[dim], nn::Init::Const(1.0));
        let bs = path.var("bias", &[dim], nn::Init::Const(0.0));

        Self { ws, bs, dim, eps }
    }
}

impl nn::ModuleT for ChannelNorm {
    fn forward_t(&self, input: &Tensor, _train: bool) -> Tensor {
        let Self {
            ref ws,
            ref bs,
            dim,
            eps,
        } = *self;

        input
            .permute(&[0, 2, 3, 1])
            .layer_norm(&[dim], Some(ws), Some(bs), eps, false)
            .permute(&[0, 3, 1, 2])
    }
}

/// The inverted-bottleneck residual block: depthwise 7×7 convolution,
/// channels-last layer norm, pointwise expansion, GELU, pointwise
/// projection, learnable layer scale.
#[derive(Debug, Clone)]
pub struct ConvNextBlockInit {
    pub dim: usize,
    pub layer_scale_init: f64,
    pub eps: f64,
}

impl ConvNextBlockInit {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            layer_scale_init: 1e-6,
            eps: 1e-6,
        }
    }

    pub fn build<'p, P>(self, path: P) -> ConvNextBlock
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            dim,
            layer_scale_init,
            eps,
        } = self;
        let dim = dim as i64;

        let dwconv = nn::conv2d(
            path / "dwconv",
            dim,
            dim,
            7,
            nn::ConvConfig {
                padding: 3,
                groups: dim,
                ..Default::default()
            },
        );
        let norm = nn::layer_norm(
            path / "norm",
            vec![dim],
            nn::LayerNormConfig {
                eps,
                ..Default::default()
            },
        );
        let pwconv1 = nn::linear(path / "pwconv1", dim, 4 * dim, Default::default());
        let pwconv2 = nn::linear(path / "pwconv2", 4 * dim, dim, Default::default());
        let gamma = path.var("gamma", &[dim], nn::Init::Const(layer_scale_init));

        ConvNextBlock {
            dwconv,
            norm,
            pwconv1,
            pwconv2,
            gamma,
        }
    }
}

#[derive(Debug)]
pub struct ConvNextBlock {
    dwconv: nn::Conv2D,
    norm: nn::LayerNorm,
    pwconv1: nn::Linear,
    pwconv2: nn::Linear,
    gamma: Tensor,
}

impl nn::ModuleT for ConvNextBlock {
    fn forward_t(&self, input: &Tensor, _train: bool) -> Tensor {
        let Self {
            ref dwconv,
            ref norm,
            ref pwconv1,
            ref pwconv2,
            ref gamma,
        } = *self;

        let xs = input
            .apply(dwconv)
            .permute(&[0, 2, 3, 1])
            .apply(norm)
            .apply(pwconv1)
            .gelu()
            .apply(pwconv2);
        let xs = (gamma * xs).permute(&[0, 3, 1, 2]);

        input + xs
    }
}

/// The patchify stem: 4×4 stride-4 convolution plus channel norm.
#[derive(Debug)]
pub struct Stem {
    conv: nn::Conv2D,
    norm: ChannelNorm,
}

impl Stem {
    pub fn new<'p, P>(path: P, in_c: usize, out_c: usize, eps: f64) -> Self
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let conv = nn::conv2d(
            path / "conv",
            in_c as i64,
            out_c as i64,
            4,
            nn::ConvConfig {
                stride: 4,
                ..Default::default()
            },
        );
        let norm = ChannelNorm::new(path / "norm", out_c as i64, eps);

        Self { conv, norm }
    }
}

impl nn::ModuleT for Stem {
    fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        self.norm.forward_t(&input.apply(&self.conv), train)
    }
}

/// One resolution stage: an optional 2×2 stride-2 downsampling layer
/// followed by a run of residual blocks.
#[derive(Debug)]
pub struct ConvNextStage {
    downsample: Option<(ChannelNorm, nn::Conv2D)>,
    blocks: Vec<ConvNextBlock>,
}

impl ConvNextStage {
    pub fn new<'p, P>(
        path: P,
        in_dim: usize,
        out_dim: usize,
        depth: usize,
        layer_scale_init: f64,
        eps: f64,
    ) -> Self
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();

        let downsample = (in_dim != out_dim).then(|| {
            let down_path = path / "downsample";
            let norm = ChannelNorm::new(&down_path / "norm", in_dim as i64, eps);
            let conv = nn::conv2d(
                &down_path / "conv",
                in_dim as i64,
                out_dim as i64,
                2,
                nn::ConvConfig {
                    stride: 2,
                    ..Default::default()
                },
            );
            (norm, conv)
        });

        let blocks_path = path / "blocks";
        let blocks = (0..depth)
            .map(|index| {
                ConvNextBlockInit {
                    dim: out_dim,
                    layer_scale_init,
                    eps,
                }
                .build(&blocks_path / format!("{}", index))
            })
            .collect();

        Self { downsample, blocks }
    }
}

impl nn::ModuleT for ConvNextStage {
    fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        let xs = match &self.downsample {
            Some((norm, conv)) => norm.forward_t(input, train).apply(conv),
            None => input.shallow_clone(),
        };

        self.blocks
            .iter()
            .fold(xs, |xs, block| block.forward_t(&xs, train))
    }
}

#[derive(Debug, Clone)]
pub struct ConvNextInit {
    /// Blocks per stage.
    pub depths: Vec<usize>,
    /// Channels per stage.
    pub dims: Vec<usize>,
    pub num_labels: usize,
    pub layer_scale_init: f64,
    pub eps: f64,
}

impl ConvNextInit {
    /// The tiny variant, the scale the pretrained 2D backbones ship at.
    pub fn tiny(num_labels: usize) -> Self {
        Self {
            depths: vec![3, 3, 9, 3],
            dims: vec![96, 192, 384, 768],
            num_labels,
            layer_scale_init: 1e-6,
            eps: 1e-6,
        }
    }

    pub fn build<'p, P>(self, path: P) -> Result<ConvNext>
    where
        P: Borrow<nn::Path<'p>>,
    {
        let path = path.borrow();
        let Self {
            depths,
            dims,
            num_labels,
            layer_scale_init,
            eps,
        } = self;

        ensure!(
            !depths.is_empty() && depths.len() == dims.len(),
            "depths and dims must be non-empty and of equal length, but get {} and {}",
            depths.len(),
            dims.len()
        );
        ensure!(num_labels > 0, "num_labels must be positive");

        let stem = Stem::new(path / "stem", 3, dims[0], eps);

        let stages_path = path / "stages";
        let stages: Vec<_> = depths
            .iter()
            .zip(&dims)
            .enumerate()
            .map(|(index, (&depth, &dim))| {
                let in_dim = if index == 0 { dims[0] } else { dims[index - 1] };
                ConvNextStage::new(
                    &stages_path / format!("{}", index),
                    in_dim,
                    dim,
                    depth,
                    layer_scale_init,
                    eps,
                )
            })
            .collect();

        let last_dim = *dims.last().unwrap() as i64;
        let norm = nn::layer_norm(
            path / "norm",
            vec![last_dim],
            nn::LayerNormConfig {
                eps,
                ..Default::default()
            },
        );
        let head = nn::linear(path / "head", last_dim, num_labels as i64, Default::default());

        Ok(ConvNext {
            stem,
            stages,
            norm,
            head,
        })
    }
}

/// The full classifier: stem, hierarchical stages, pooled norm, and the
/// classification head.
#[derive(Debug)]
pub struct ConvNext {
    stem: Stem,
    stages: Vec<ConvNextStage>,
    norm: nn::LayerNorm,
    head: nn::Linear,
}

impl ConvNext {
    /// Run only the hierarchical feature stages, skipping pooling and the
    /// head. The output is `[N, C, H/32, W/32]` for the 4-stage layout.
    pub fn features(&self, input: &Tensor, train: bool) -> Tensor {
        let xs = self.stem.forward_t(input, train);
        self.stages
            .iter()
            .fold(xs, |xs, stage| stage.forward_t(&xs, train))
    }

    /// Strip the pooled norm and the classification head and return the
    /// feature-extraction modules as one sequential module.
    pub fn into_feature_extractor(self) -> nn::SequentialT {
        let Self { stem, stages, .. } = self;

        let mut seq = nn::seq_t().add(stem);
        for stage in stages {
            seq = seq.add(stage);
        }
        seq
    }
}

impl nn::ModuleT for ConvNext {
    fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        self.features(input, train)
            .adaptive_avg_pool2d(&[1, 1])
            .flatten(1, -1)
            .apply(&self.norm)
            .apply(&self.head)
    }
}
