//! Fixed-point SILK speech codec.
//!
//! The encoder takes 10 ms multiples of linear PCM at any common API
//! rate, runs them through voice activity detection, pitch and noise
//! shape analysis and a noise shaping quantizer, and range-codes one
//! payload per packet of 20 to 100 ms, optionally with low bitrate
//! redundancy and discontinuous transmission. The decoder reverses the
//! process, with packet loss concealment and comfort noise generation
//! for lost or suppressed packets.

#![no_std]

extern crate alloc;

mod a2nlsf;
mod ana_filt_bank_1;
mod apply_sine_window;
mod autocorr;
mod biquad;
mod biquad_alt;
mod burg_modified;
mod bwexpander;
mod bwexpander_32;
mod cng;
mod code_signs;
mod common;
mod control_audio_bandwidth;
mod control_codec;
mod corr_matrix;
mod dec_api;
mod decode_core;
mod decode_frame;
mod decode_parameters;
mod decode_pitch;
mod decode_pulses;
mod decoder_control;
mod decoder_set_fs;
mod decoder_state;
mod enc_api;
mod encode_frame;
mod encode_parameters;
mod encode_pulses;
mod encoder_control;
mod encoder_state;
mod errors;
mod find_lpc;
mod find_ltp;
mod find_pitch_lags;
mod find_pred_coefs;
mod gain_quant;
mod hp_variable_cutoff;
mod interpolate;
mod k2a;
mod lin2log;
mod log2lin;
mod lp_variable_cutoff;
mod lpc_analysis_filter;
mod lpc_inv_pred_gain;
mod lpc_synthesis_filter;
mod ltp_analysis_filter;
mod ltp_scale_ctrl;
mod math;
mod nlsf2a;
mod nlsf2a_stable;
mod nlsf_msvq_decode;
mod nlsf_msvq_encode;
mod nlsf_stabilize;
mod nlsf_vq_weights_laroia;
mod noise_shape_analysis;
mod nsq;
mod nsq_del_dec;
mod pitch_analysis_core;
mod pitch_est_tables;
mod plc;
mod prefilter;
mod process_gains;
mod process_nlsfs;
mod quant_ltp_gains;
mod range_coder;
mod resampler;
mod resampler_down2;
mod resampler_down2_3;
mod resampler_down3;
mod resampler_private_ar2;
mod resampler_private_down_fir;
mod resampler_private_iir_fir;
mod resampler_private_up2_hq;
mod resampler_rom;
mod residual_energy;
mod schur;
mod schur64;
mod shell_coder;
mod sigm_q15;
mod solve_ls;
mod sort;
mod table_lsf_cos;
mod tables_gain;
mod tables_ltp;
mod tables_nlsf;
mod tables_nlsf_cb0_10;
mod tables_nlsf_cb0_16;
mod tables_nlsf_cb1_10;
mod tables_nlsf_cb1_16;
mod tables_other;
mod tables_pitch_lag;
mod tables_pulses_per_block;
mod tables_sign;
mod tables_type_offset;
mod vad;
mod vector_ops;
mod vq_wmat_ec;
mod warped_autocorrelation;

pub use common::SignalType;
pub use dec_api::{decoder_size_bytes, get_toc, search_for_lbrr, DecControl, SilkDecoder, Toc};
pub use enc_api::{encoder_size_bytes, EncControl, SilkEncoder};
pub use errors::SilkError;
