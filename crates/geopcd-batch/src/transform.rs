use geopcd_io::{PcdPoint, RecordLayout};
use geopcd_linalg::RigidTransform;

/// Error types for applying a transform to decoded points.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A spatial field is absent or not a single floating point value
    #[error("Missing spatial field: {0}")]
    MissingSpatialFields(String),
}

/// Scalar indices of the `x`, `y` and `z` values within a decoded point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialFields {
    x: usize,
    y: usize,
    z: usize,
}

impl SpatialFields {
    /// Locate the spatial fields of a layout.
    ///
    /// Each of `x`, `y` and `z` must exist with `COUNT 1` and a float type.
    pub fn resolve(layout: &RecordLayout) -> Result<Self, TransformError> {
        let index_of = |name: &str| -> Result<usize, TransformError> {
            let field = layout
                .field(name)
                .ok_or_else(|| TransformError::MissingSpatialFields(format!("no '{name}' field")))?;
            if field.count != 1 || !field.scalar_type.is_float() {
                return Err(TransformError::MissingSpatialFields(format!(
                    "'{name}' is {:?} x {}, expected a single float",
                    field.scalar_type, field.count
                )));
            }
            Ok(field.scalar_index)
        };

        Ok(Self {
            x: index_of("x")?,
            y: index_of("y")?,
            z: index_of("z")?,
        })
    }
}

/// Apply a rigid transform to the spatial fields of one point.
///
/// Coordinates are mapped in f64 and written back with the width of the
/// field they came from; every other scalar is left untouched. The point is
/// not modified when an error is returned.
pub fn apply_transform(
    transform: &RigidTransform,
    spatial: &SpatialFields,
    point: &mut PcdPoint,
) -> Result<(), TransformError> {
    let read = |index: usize, name: &str| {
        point
            .scalars()
            .get(index)
            .filter(|v| v.scalar_type().is_float())
            .map(|v| v.as_f64())
            .ok_or_else(|| {
                TransformError::MissingSpatialFields(format!("point has no float '{name}'"))
            })
    };

    let p = [
        read(spatial.x, "x")?,
        read(spatial.y, "y")?,
        read(spatial.z, "z")?,
    ];
    let mapped = transform.apply(p);

    for (index, value) in [spatial.x, spatial.y, spatial.z].into_iter().zip(mapped) {
        if let Some(scalar) = point.scalar_mut(index) {
            scalar.set_float(value);
        }
    }

    Ok(())
}

/// Apply a rigid transform to every point decoded with `layout`.
///
/// Fails before touching any point if the layout has no usable spatial
/// fields, so a file is either transformed completely or not at all.
pub fn transform_points(
    transform: &RigidTransform,
    layout: &RecordLayout,
    points: &mut [PcdPoint],
) -> Result<(), TransformError> {
    let spatial = SpatialFields::resolve(layout)?;
    points
        .iter_mut()
        .try_for_each(|point| apply_transform(transform, &spatial, point))
}
