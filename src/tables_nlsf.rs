//! Multi-stage NLSF vector-quantizer codebook descriptors.
//!
//! A codebook is a sequence of stages; stage 0 holds full NLSF vectors in
//! Q15, later stages hold residual vectors added on top. Each stage carries
//! Q5-bit codeword costs for the rate-distortion search, plus a CDF for the
//! range coder. The codebooks themselves live in the `tables_nlsf_cb*`
//! modules, one per (signal type, LPC order) pair.

/// Upper bound on stages across all codebooks.
pub const NLSF_MSVQ_MAX_CB_STAGES: usize = 4;

/// One quantizer stage.
pub struct NlsfCbStage {
    /// Vectors in this stage.
    pub n_vectors: usize,
    /// Vectors, flattened; `n_vectors * order` entries, Q15.
    pub cb_q15: &'static [i16],
    /// Codeword costs, Q5 bits, one per vector.
    pub rates_q5: &'static [i16],
}

/// A complete multi-stage codebook.
pub struct NlsfCb {
    pub stages: &'static [NlsfCbStage],
    /// Minimum spacing between neighboring NLSFs after dequantization,
    /// `order + 1` entries including the 0 and pi boundaries, Q15.
    pub delta_min_q15: &'static [i16],
    /// Index CDF per stage.
    pub cdfs: &'static [&'static [u16]],
    /// Decoder search start per stage.
    pub middle_ix: &'static [usize],
}

impl NlsfCb {
    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}
