use anyhow::{ensure, Result};
use candle_core::{DType, Tensor, D};

/// Mean of the unmasked token states followed by L2 normalisation.
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]`; returns `[B, H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _tokens, hidden_dim) = match hidden.dims() {
        &[b, t, h] => (b, t, h),
        other => anyhow::bail!("hidden shape must be [B,T,H], got {other:?}"),
    };
    let pooled = l2_normalize(&masked_mean(hidden, attention_mask)?)?;
    ensure!(pooled.dims() == [batch, hidden_dim].as_slice(), "pooled shape mismatch: {:?}", pooled.dims());
    Ok(pooled)
}

/// `[B, T, H]` -> `[B, H]`, averaging only positions where the mask is 1.
fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let weights = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&weights.unsqueeze(D::Minus1)?)?.sum(1)?;
    let counts = weights.sum_keepdim(1)?;
    Ok(summed.broadcast_div(&counts)?)
}

fn l2_normalize(v: &Tensor) -> Result<Tensor> {
    let eps = if v.dtype() == DType::F16 { 1e-6 } else { 1e-12 };
    let norm = (v.sqr()?.sum_keepdim(1)?.sqrt()? + eps)?;
    Ok(v.broadcast_div(&norm)?)
}
