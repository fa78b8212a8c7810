use crate::error::PcdError;
use crate::header::PcdHeader;
use crate::scalar::ScalarType;

/// One field of a resolved record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutField {
    /// The field name.
    pub name: String,
    /// The element type.
    pub scalar_type: ScalarType,
    /// Number of elements per record.
    pub count: usize,
    /// Byte offset of the first element within a record.
    pub offset: usize,
    /// Index of the first element within a decoded point's scalars.
    pub scalar_index: usize,
}

impl LayoutField {
    /// Size in bytes of the whole field.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.scalar_type.size() * self.count
    }
}

/// The byte-level description of one fixed-size point record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<LayoutField>,
    record_size: usize,
    num_scalars: usize,
}

impl RecordLayout {
    /// Resolve the layout declared by a header.
    ///
    /// Fields are packed in declaration order with no padding.
    pub fn from_header(header: &PcdHeader) -> Result<Self, PcdError> {
        let mut fields = Vec::with_capacity(header.fields().len());
        let mut offset = 0usize;
        let mut scalar_index = 0usize;

        for desc in header.fields() {
            let scalar_type = ScalarType::from_tag(desc.type_tag, desc.byte_size).ok_or(
                PcdError::UnknownTypeEncoding {
                    type_tag: desc.type_tag,
                    byte_size: desc.byte_size,
                },
            )?;

            let field = LayoutField {
                name: desc.name.clone(),
                scalar_type,
                count: desc.count,
                offset,
                scalar_index,
            };

            offset = desc
                .byte_size
                .checked_mul(desc.count)
                .and_then(|len| offset.checked_add(len))
                .ok_or_else(|| PcdError::MalformedHeader("record size overflows".into()))?;
            scalar_index += desc.count;

            fields.push(field);
        }

        Ok(Self {
            fields,
            record_size: offset,
            num_scalars: scalar_index,
        })
    }

    /// The fields in record order.
    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&LayoutField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total bytes per record.
    #[inline]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Total scalars per record, i.e. the sum of all field counts.
    #[inline]
    pub fn num_scalars(&self) -> usize {
        self.num_scalars
    }
}
