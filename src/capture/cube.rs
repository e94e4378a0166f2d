use crate::foundation::core::{ColorFormat, alloc_rgba};
use crate::foundation::error::{PanoError, PanoResult};
use crate::foundation::math::{Euler, Quat, Vec3, rotate_local};

/// Linear RGBA float image holding one rendered face.
pub type FaceImage = image::Rgba32FImage;

/// One of the six directional faces of a capture cube, relative to the cube's own frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CubeFace {
    /// +X
    PosX,
    /// -X
    NegX,
    /// +Y (up)
    PosY,
    /// -Y (down)
    NegY,
    /// +Z (capture forward)
    PosZ,
    /// -Z
    NegZ,
}

/// Orthonormal frame of a face: viewing direction plus image right/up axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBasis {
    /// Direction through the face centre.
    pub forward: Vec3,
    /// Direction of increasing image column.
    pub right: Vec3,
    /// Direction of decreasing image row.
    pub up: Vec3,
}

impl CubeFace {
    /// All faces in storage order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// Storage index of this face inside a [`FaceSet`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short lowercase name (`px`, `nx`, ...), used for face file names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PosX => "px",
            Self::NegX => "nx",
            Self::PosY => "py",
            Self::NegY => "ny",
            Self::PosZ => "pz",
            Self::NegZ => "nz",
        }
    }

    /// Face frame in cube space.
    ///
    /// These are exactly the camera frames reached by [`CAPTURE_SEQUENCE`] from an identity
    /// orientation, so sampling and capture agree.
    pub const fn basis(self) -> FaceBasis {
        match self {
            Self::PosX => FaceBasis {
                forward: Vec3::X,
                right: Vec3::Z,
                up: Vec3::Y,
            },
            Self::NegX => FaceBasis {
                forward: Vec3::NEG_X,
                right: Vec3::NEG_Z,
                up: Vec3::Y,
            },
            Self::PosY => FaceBasis {
                forward: Vec3::Y,
                right: Vec3::NEG_X,
                up: Vec3::NEG_Z,
            },
            Self::NegY => FaceBasis {
                forward: Vec3::NEG_Y,
                right: Vec3::NEG_X,
                up: Vec3::Z,
            },
            Self::PosZ => FaceBasis {
                forward: Vec3::Z,
                right: Vec3::NEG_X,
                up: Vec3::Y,
            },
            Self::NegZ => FaceBasis {
                forward: Vec3::NEG_Z,
                right: Vec3::X,
                up: Vec3::Y,
            },
        }
    }

    /// Face whose axis dominates `dir` (largest absolute component).
    ///
    /// Ties resolve toward X, then Y.
    pub fn dominant(dir: Vec3) -> CubeFace {
        let a = dir.abs();
        if a.x >= a.y && a.x >= a.z {
            if dir.x >= 0.0 { Self::PosX } else { Self::NegX }
        } else if a.y >= a.z {
            if dir.y >= 0.0 { Self::PosY } else { Self::NegY }
        } else if dir.z >= 0.0 {
            Self::PosZ
        } else {
            Self::NegZ
        }
    }
}

/// Fixed render order: each step rotates the camera relative to its previous orientation and
/// is immediately followed by a render into the named face.
pub const CAPTURE_SEQUENCE: [(CubeFace, Euler); 6] = [
    (CubeFace::PosX, Euler::yaw(90.0)),
    (CubeFace::NegZ, Euler::yaw(90.0)),
    (CubeFace::NegX, Euler::yaw(90.0)),
    (CubeFace::PosZ, Euler::yaw(90.0)),
    (CubeFace::PosY, Euler::pitch(90.0)),
    (CubeFace::NegY, Euler::pitch(180.0)),
];

/// Offset applied to the second cube of a double render so its seams fall elsewhere.
pub const SECOND_CUBE_OFFSET: Euler = Euler::new(-45.0, 45.0, 0.0);

/// World orientation of every face when the cube frame is `base`, in capture order.
pub fn face_orientations(base: Quat) -> [(CubeFace, Quat); 6] {
    let mut q = base;
    CAPTURE_SEQUENCE.map(|(face, step)| {
        q = rotate_local(q, step);
        (face, q)
    })
}

/// Which of the (up to two) cubes of a frame is being handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeSlot {
    /// The cube aligned to the capture frame.
    Primary,
    /// The double-render cube, offset by [`SECOND_CUBE_OFFSET`].
    Secondary,
}

impl CubeSlot {
    /// Slots used for a frame capturing `count` cubes.
    pub fn for_count(count: usize) -> &'static [CubeSlot] {
        if count >= 2 {
            &[CubeSlot::Primary, CubeSlot::Secondary]
        } else {
            &[CubeSlot::Primary]
        }
    }

    /// Storage index of the slot.
    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }
}

/// Six square face images of one cube.
#[derive(Clone, Debug)]
pub struct FaceSet {
    size: u32,
    faces: [FaceImage; 6],
}

impl FaceSet {
    /// Allocate six black `size x size` faces.
    ///
    /// Fails with [`PanoError::Render`] when the faces cannot be allocated.
    pub fn new(size: u32) -> PanoResult<Self> {
        let size = size.max(1);
        let mut faces = Vec::with_capacity(6);
        for _ in CubeFace::ALL {
            let face = FaceImage::from_raw(size, size, alloc_rgba(size, size)?)
                .ok_or_else(|| PanoError::render(format!("{size}px face buffer size mismatch")))?;
            faces.push(face);
        }
        let faces: [FaceImage; 6] = faces
            .try_into()
            .map_err(|_| PanoError::render("expected six face buffers"))?;
        Ok(Self { size, faces })
    }

    /// Build a set from already rendered faces given in [`CubeFace::ALL`] order.
    pub fn from_faces(faces: [FaceImage; 6]) -> PanoResult<Self> {
        let size = faces[0].width();
        for (face, img) in CubeFace::ALL.iter().zip(&faces) {
            if img.width() != size || img.height() != size || size == 0 {
                return Err(PanoError::validation(format!(
                    "face '{}' is {}x{}, expected {size}x{size}",
                    face.name(),
                    img.width(),
                    img.height()
                )));
            }
        }
        Ok(Self { size, faces })
    }

    /// Edge length of every face in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Borrow one face.
    pub fn face(&self, face: CubeFace) -> &FaceImage {
        &self.faces[face.index()]
    }

    /// Mutably borrow one face.
    pub fn face_mut(&mut self, face: CubeFace) -> &mut FaceImage {
        &mut self.faces[face.index()]
    }
}

/// Face sets kept alive across ticks, reallocated only when the geometry changes.
#[derive(Debug, Default)]
pub struct CubeTargets {
    format: Option<ColorFormat>,
    sets: Vec<FaceSet>,
}

impl CubeTargets {
    /// Create an empty target collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `count` face sets of `size` pixels exist for `format`.
    ///
    /// Returns `true` when the buffers were (re)allocated. On an allocation failure the previous
    /// buffers are kept and the error is returned.
    pub fn ensure(&mut self, size: u32, count: usize, format: ColorFormat) -> PanoResult<bool> {
        let size = size.max(1);
        let fits = self.format == Some(format)
            && self.sets.len() == count
            && self.sets.iter().all(|s| s.size() == size);
        if fits {
            return Ok(false);
        }
        let sets = (0..count)
            .map(|_| FaceSet::new(size))
            .collect::<PanoResult<Vec<_>>>()?;
        self.format = Some(format);
        self.sets = sets;
        Ok(true)
    }

    /// Number of allocated face sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no face set is allocated yet.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Borrow the face set of `slot`, if allocated.
    pub fn get(&self, slot: CubeSlot) -> Option<&FaceSet> {
        self.sets.get(slot.index())
    }

    /// Mutably borrow the face set of `slot`, if allocated.
    pub fn get_mut(&mut self, slot: CubeSlot) -> Option<&mut FaceSet> {
        self.sets.get_mut(slot.index())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/cube.rs"]
mod tests;
