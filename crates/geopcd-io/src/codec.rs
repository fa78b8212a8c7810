use crate::error::PcdError;
use crate::layout::{LayoutField, RecordLayout};
use crate::scalar::Scalar;

/// A decoded point record.
///
/// Scalars are stored flat in record order; a field's values are found
/// through its [`LayoutField::scalar_index`] and [`LayoutField::count`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcdPoint {
    scalars: Vec<Scalar>,
}

impl PcdPoint {
    /// Create a point from its scalars in record order.
    pub fn new(scalars: Vec<Scalar>) -> Self {
        Self { scalars }
    }

    /// All scalars in record order.
    pub fn scalars(&self) -> &[Scalar] {
        &self.scalars
    }

    /// The values of a field, or `None` if the point is too short for it.
    pub fn field(&self, field: &LayoutField) -> Option<&[Scalar]> {
        self.scalars
            .get(field.scalar_index..field.scalar_index + field.count)
    }

    /// Mutable access to one scalar.
    pub fn scalar_mut(&mut self, index: usize) -> Option<&mut Scalar> {
        self.scalars.get_mut(index)
    }
}

/// Decode `num_points` records from the data section of a binary PCD file.
///
/// Bytes beyond the last declared record are ignored.
///
/// # Arguments
///
/// * `data` - The bytes following the header.
/// * `layout` - The record layout resolved from the header.
/// * `num_points` - The number of records to decode.
///
/// # Returns
///
/// The points in file order.
pub fn decode_points(
    data: &[u8],
    layout: &RecordLayout,
    num_points: usize,
) -> Result<Vec<PcdPoint>, PcdError> {
    let record_size = layout.record_size();
    if record_size == 0 {
        return Err(PcdError::MalformedHeader("record size is zero".into()));
    }

    let expected = record_size
        .checked_mul(num_points)
        .ok_or_else(|| PcdError::MalformedHeader("data section size overflows".into()))?;

    if data.len() < expected {
        return Err(PcdError::TruncatedData {
            expected,
            actual: data.len(),
        });
    }

    let points = data[..expected]
        .chunks_exact(record_size)
        .map(|record| {
            let mut scalars = Vec::with_capacity(layout.num_scalars());
            for field in layout.fields() {
                let size = field.scalar_type.size();
                let bytes = &record[field.offset..field.offset + field.byte_len()];
                scalars.extend(
                    bytes
                        .chunks_exact(size)
                        .map(|elem| field.scalar_type.read_le(elem)),
                );
            }
            PcdPoint::new(scalars)
        })
        .collect();

    Ok(points)
}

/// Encode points into a binary PCD data section.
///
/// Fails with [`PcdError::RecordMismatch`] if a point does not carry exactly
/// the scalars, with exactly the types, that `layout` declares.
pub fn encode_points(points: &[PcdPoint], layout: &RecordLayout) -> Result<Vec<u8>, PcdError> {
    let mut out = Vec::with_capacity(points.len() * layout.record_size());

    for (i, point) in points.iter().enumerate() {
        if point.scalars.len() != layout.num_scalars() {
            return Err(PcdError::RecordMismatch(format!(
                "point {i} has {} scalars, layout declares {}",
                point.scalars.len(),
                layout.num_scalars()
            )));
        }

        for field in layout.fields() {
            let values = point.field(field).unwrap_or_default();
            for value in values {
                if value.scalar_type() != field.scalar_type {
                    return Err(PcdError::RecordMismatch(format!(
                        "point {i} field '{}' holds {:?}, layout declares {:?}",
                        field.name,
                        value.scalar_type(),
                        field.scalar_type
                    )));
                }
                value.write_le(&mut out);
            }
        }
    }

    Ok(out)
}
