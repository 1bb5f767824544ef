//! Spin rotation: a stereo decorrelating effect built from spin-3/2 operators.
//!
//! # Design Overview
//!
//! Each stereo frame `(L, R)` is packed into one complex number `L + iR`. Frames are
//! grouped into chunks of four, and each chunk is multiplied by a 4×4 complex
//! operator built from the spin-3/2 matrices `Sx`, `Sy` and `Sz`:
//!
//! ```text
//! out = cos φ · sin θ · (Sx · chunk) + sin φ · sin θ · (Sy · chunk) + cos θ · (Sz · chunk)
//! ```
//!
//! The real part of each output value goes to the left channel, the imaginary part
//! to the right channel. The weighted sum of the three matrices is formed once per
//! call, so each chunk costs a single matrix-vector product.
//!
//! ## Chunk Buffering
//!
//! Blocks handed over by the host rarely hold a multiple of four frames. Up to three
//! trailing frames are held back in a carry buffer and prepended to the next call:
//!
//! 1. If the input is shorter than `carry_len + 4`, it is copied through unchanged
//!    and the carry buffer is left alone
//! 2. Otherwise the carry frames (oldest first) and the new input form one stream
//! 3. The last `(carry_len + input_len) % 4` frames become the new carry
//! 4. All complete chunks are transformed
//!
//! The number of frames produced therefore differs from the input length by up to
//! three in either direction. Calls for one stream must arrive in order; splitting a
//! stream across calls gives the same output as one call, as long as no call hits
//! the passthrough case.
//!
//! The carry buffer is an inline array, so processing never allocates.

use num_complex::Complex32;

/// Frames per transformed chunk.
pub const CHUNK_SIZE: usize = 4;

/// Largest number of frames the carry buffer can hold.
pub const MAX_CARRY: usize = CHUNK_SIZE - 1;

type Operator = [[Complex32; CHUNK_SIZE]; CHUNK_SIZE];

const SQRT_3: f32 = 1.732_050_8;
const ZERO: Complex32 = Complex32::new(0.0, 0.0);

const fn re(x: f32) -> Complex32 {
    Complex32::new(x, 0.0)
}

const fn im(x: f32) -> Complex32 {
    Complex32::new(0.0, x)
}

/// Spin-3/2 x operator.
pub const SPIN_X: Operator = [
    [ZERO, re(SQRT_3), ZERO, ZERO],
    [re(SQRT_3), ZERO, re(2.0), ZERO],
    [ZERO, re(2.0), ZERO, re(SQRT_3)],
    [ZERO, ZERO, re(SQRT_3), ZERO],
];

/// Spin-3/2 y operator.
pub const SPIN_Y: Operator = [
    [ZERO, im(-SQRT_3), ZERO, ZERO],
    [im(SQRT_3), ZERO, im(-2.0), ZERO],
    [ZERO, im(2.0), ZERO, im(-SQRT_3)],
    [ZERO, ZERO, im(SQRT_3), ZERO],
];

/// Spin-3/2 z operator.
pub const SPIN_Z: Operator = [
    [re(3.0), ZERO, ZERO, ZERO],
    [ZERO, re(1.0), ZERO, ZERO],
    [ZERO, ZERO, re(-1.0), ZERO],
    [ZERO, ZERO, ZERO, re(-3.0)],
];

/// Per-voice spin rotation effect.
///
/// Angles are in radians and expected in [0, 2π); they are used as given.
///
/// # Examples
///
/// ```
/// use spinsynth::SpinRotation;
///
/// let mut rotation = SpinRotation::new();
/// rotation.set_angles(0.3, 1.2);
///
/// let left = [0.1_f32; 6];
/// let right = [0.0_f32; 6];
/// let mut out_left = [0.0; 9];
/// let mut out_right = [0.0; 9];
///
/// // Six frames in: one chunk of four out, two frames carried over.
/// let produced = rotation.spin_rotate(&left, &right, &mut out_left, &mut out_right);
/// assert_eq!(produced, 4);
/// assert_eq!(rotation.carry_len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SpinRotation {
    phi: f32,
    theta: f32,
    carry: [Complex32; MAX_CARRY],
    carry_len: usize,
}

impl SpinRotation {
    pub fn new() -> Self {
        Self {
            phi: 0.0,
            theta: 0.0,
            carry: [ZERO; MAX_CARRY],
            carry_len: 0,
        }
    }

    pub fn set_phi(&mut self, phi: f32) {
        self.phi = phi;
    }

    pub fn set_theta(&mut self, theta: f32) {
        self.theta = theta;
    }

    pub fn set_angles(&mut self, phi: f32, theta: f32) {
        self.phi = phi;
        self.theta = theta;
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Number of frames waiting in the carry buffer (0 to 3).
    pub fn carry_len(&self) -> usize {
        self.carry_len
    }

    /// Drops any carried frames. Call whenever the stream restarts.
    pub fn clear_buffer(&mut self) {
        self.carry_len = 0;
    }

    /// The combined operator for the current angles.
    pub fn operator(&self) -> Operator {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let wx = cos_phi * sin_theta;
        let wy = sin_phi * sin_theta;
        let wz = cos_theta;

        let mut op = [[ZERO; CHUNK_SIZE]; CHUNK_SIZE];
        for (r, row) in op.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = SPIN_X[r][c] * wx + SPIN_Y[r][c] * wy + SPIN_Z[r][c] * wz;
            }
        }
        op
    }

    /// Rotates one block of stereo frames.
    ///
    /// Writes the produced frames to the front of `out_left`/`out_right` and returns
    /// how many were written. `left` and `right` must have equal length, and the
    /// outputs must hold at least `left.len() + 3` frames.
    pub fn spin_rotate(
        &mut self,
        left: &[f32],
        right: &[f32],
        out_left: &mut [f32],
        out_right: &mut [f32],
    ) -> usize {
        debug_assert_eq!(left.len(), right.len());
        let input_len = left.len();

        if input_len < self.carry_len + CHUNK_SIZE {
            out_left[..input_len].copy_from_slice(left);
            out_right[..input_len].copy_from_slice(right);
            return input_len;
        }

        let total = self.carry_len + input_len;
        let remainder = total % CHUNK_SIZE;
        let produced = total - remainder;
        let op = self.operator();

        let frames = self.carry[..self.carry_len].iter().copied().chain(
            left.iter()
                .zip(right.iter())
                .map(|(&l, &r)| Complex32::new(l, r)),
        );

        let mut chunk = [ZERO; CHUNK_SIZE];
        let mut filled = 0;
        let mut written = 0;
        for frame in frames.take(produced) {
            chunk[filled] = frame;
            filled += 1;
            if filled == CHUNK_SIZE {
                for (k, value) in apply(&op, &chunk).iter().enumerate() {
                    out_left[written + k] = value.re;
                    out_right[written + k] = value.im;
                }
                written += CHUNK_SIZE;
                filled = 0;
            }
        }

        for (slot, i) in (input_len - remainder..input_len).enumerate() {
            self.carry[slot] = Complex32::new(left[i], right[i]);
        }
        self.carry_len = remainder;

        produced
    }

    /// Allocating variant of [`spin_rotate`](Self::spin_rotate) returning the
    /// produced frames as `(left, right)`. Not meant for the audio thread.
    pub fn spin_rotate_vec(&mut self, left: &[f32], right: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let capacity = left.len() + MAX_CARRY;
        let mut out_left = vec![0.0; capacity];
        let mut out_right = vec![0.0; capacity];
        let produced = self.spin_rotate(left, right, &mut out_left, &mut out_right);
        out_left.truncate(produced);
        out_right.truncate(produced);
        (out_left, out_right)
    }
}

impl Default for SpinRotation {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(op: &Operator, chunk: &[Complex32; CHUNK_SIZE]) -> [Complex32; CHUNK_SIZE] {
    let mut out = [ZERO; CHUNK_SIZE];
    for (row, value) in op.iter().zip(out.iter_mut()) {
        *value = row.iter().zip(chunk.iter()).map(|(m, x)| m * x).sum();
    }
    out
}
