//! Checkpoint loading with a tolerated head mismatch.

use crate::{common::*, convnext::ConvNextInit, wrapper::BackboneWrapper};

/// Parameters under this prefix belong to the discarded classification
/// head; they are the only ones allowed to mismatch the checkpoint.
const HEAD_PREFIX: &str = "model.head.";

/// Rebuild the pretrained feature extractor from a fine-tuning checkpoint
/// on an explicit device.
///
/// The classifier is instantiated at the tiny scale with a deliberately
/// mismatched 4-class head. Every parameter outside the head must match the
/// checkpoint by name and shape exactly, in both directions; any other
/// mismatch fails the load. The head and the pooled norm are discarded when
/// the feature stages are extracted.
pub fn load_backbone(checkpoint: impl AsRef<Path>, device: Device) -> Result<nn::SequentialT> {
    load_backbone_with(ConvNextInit::tiny(4), checkpoint, device)
}

/// [`load_backbone`] with an explicit architecture layout.
pub fn load_backbone_with(
    init: ConvNextInit,
    checkpoint: impl AsRef<Path>,
    device: Device,
) -> Result<nn::SequentialT> {
    let checkpoint = checkpoint.as_ref();

    let mut vs = nn::VarStore::new(device);
    let wrapper = BackboneWrapper::new(&vs.root(), init)?;
    load_tolerant(&mut vs, checkpoint, HEAD_PREFIX)
        .with_context(|| format!("failed to load checkpoint '{}'", checkpoint.display()))?;

    info!("loaded backbone checkpoint '{}'", checkpoint.display());

    Ok(wrapper.into_inner().into_feature_extractor())
}

/// Copy the checkpoint's named tensors into the store, requiring an exact
/// name and shape match except under `tolerated_prefix`.
fn load_tolerant(vs: &mut nn::VarStore, path: &Path, tolerated_prefix: &str) -> Result<()> {
    ensure!(
        path.is_file(),
        "the checkpoint file '{}' does not exist",
        path.display()
    );

    let named: HashMap<String, Tensor> = Tensor::load_multi_with_device(path, vs.device())?
        .into_iter()
        .collect();
    let mut variables = vs.variables();

    for (name, variable) in variables.iter_mut() {
        let source = match named.get(name) {
            Some(source) => source,
            None => {
                ensure!(
                    name.starts_with(tolerated_prefix),
                    "the checkpoint has no parameter '{}'",
                    name
                );
                // the head keeps its fresh initialization
                continue;
            }
        };

        if source.size() != variable.size() {
            ensure!(
                name.starts_with(tolerated_prefix),
                "shape mismatch for parameter '{}': checkpoint {:?}, architecture {:?}",
                name,
                source.size(),
                variable.size()
            );
            warn!("ignored mismatched head parameter '{}'", name);
            continue;
        }

        tch::no_grad(|| variable.copy_(source));
    }

    for name in named.keys() {
        ensure!(
            variables.contains_key(name) || name.starts_with(tolerated_prefix),
            "the architecture has no parameter '{}'",
            name
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convnext::ConvNextInit;
    use std::fs;

    fn small_init(num_labels: usize) -> ConvNextInit {
        ConvNextInit {
            depths: vec![1, 1],
            dims: vec![8, 16],
            num_labels,
            layer_scale_init: 1e-6,
            eps: 1e-6,
        }
    }

    fn checkpoint_path(name: &str) -> PathBuf {
        let _ = pretty_env_logger::try_init();
        let dir = std::env::temp_dir().join(format!("slivit-backbone-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn save_checkpoint(init: ConvNextInit, path: &Path) {
        let vs = nn::VarStore::new(Device::Cpu);
        let _wrapper = BackboneWrapper::new(&vs.root(), init).unwrap();
        vs.save(path).unwrap();
    }

    #[test]
    fn mismatched_head_is_tolerated_test() {
        // checkpoint saved with a 2-class head, architecture built with 4
        let path = checkpoint_path("head-mismatch.ot");
        save_checkpoint(small_init(2), &path);

        let extractor = load_backbone_with(small_init(4), &path, Device::Cpu).unwrap();

        let input = Tensor::rand(&[1, 3, 32, 32], (Kind::Float, Device::Cpu));
        let output = extractor.forward_t(&input, false);
        assert_eq!(output.size(), &[1, 16, 4, 4]);
    }

    #[test]
    fn matching_checkpoint_test() {
        let path = checkpoint_path("exact.ot");
        save_checkpoint(small_init(4), &path);

        assert!(load_backbone_with(small_init(4), &path, Device::Cpu).is_ok());
    }

    #[test]
    fn body_shape_mismatch_aborts_test() {
        // a checkpoint with different stage widths must be rejected
        let path = checkpoint_path("body-mismatch.ot");
        let mut other = small_init(4);
        other.dims = vec![8, 32];
        save_checkpoint(other, &path);

        assert!(load_backbone_with(small_init(4), &path, Device::Cpu).is_err());
    }

    #[test]
    fn missing_body_parameter_aborts_test() {
        // a checkpoint with fewer stages lacks body parameters entirely
        let path = checkpoint_path("missing-body.ot");
        let mut other = small_init(4);
        other.depths = vec![1];
        other.dims = vec![8];
        save_checkpoint(other, &path);

        assert!(load_backbone_with(small_init(4), &path, Device::Cpu).is_err());
    }

    #[test]
    fn missing_checkpoint_file_test() {
        let path = checkpoint_path("no-such-checkpoint.ot");
        assert!(load_backbone_with(small_init(4), &path, Device::Cpu).is_err());
    }

    #[test]
    fn loaded_values_test() {
        // parameters outside the head carry the checkpoint's exact values
        let path = checkpoint_path("values.ot");
        save_checkpoint(small_init(2), &path);

        let saved: HashMap<String, Tensor> =
            Tensor::load_multi(&path).unwrap().into_iter().collect();

        let mut vs = nn::VarStore::new(Device::Cpu);
        let _wrapper = BackboneWrapper::new(&vs.root(), small_init(4)).unwrap();
        super::load_tolerant(&mut vs, &path, HEAD_PREFIX).unwrap();

        let loaded = vs.variables();
        let name = "model.stem.conv.weight";
        assert_eq!(loaded[name], saved[name]);
    }
}
