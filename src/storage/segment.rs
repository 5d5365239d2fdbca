// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Fixed-capacity column segments and the per-column segment store.
//!
//! Each segment holds `BLOCK_SIZE / elem_size` fixed-width elements in a
//! contiguous byte buffer. Values are little-endian; NULL is stored as a
//! type-specific sentinel, and strings are stored as 8-byte handles into
//! the owning row chunk's string heap.

use crate::types::{DataType, DataValue, RowId};

/// Handle value marking a NULL string slot.
pub(crate) const NULL_STRING_HANDLE: u64 = u64::MAX;

const BOOL_NULL: u8 = u8::MAX;

/// Encode one fixed-width element into `buf`.
///
/// String columns never pass through here; their heap handles are encoded
/// with [`encode_string_handle`].
pub(crate) fn encode_element(buf: &mut Vec<u8>, ty: DataType, value: &DataValue) {
    match (ty, value) {
        (DataType::Bool, DataValue::Bool(v)) => buf.push(*v as u8),
        (DataType::Bool, DataValue::Null) => buf.push(BOOL_NULL),
        (DataType::Int32, DataValue::Int32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (DataType::Int32, DataValue::Null) => buf.extend_from_slice(&i32::MIN.to_le_bytes()),
        (DataType::Int64, DataValue::Int64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (DataType::Int64, DataValue::Null) => buf.extend_from_slice(&i64::MIN.to_le_bytes()),
        (DataType::Float64, DataValue::Float64(v)) => {
            buf.extend_from_slice(&v.into_inner().to_le_bytes())
        }
        (DataType::Float64, DataValue::Null) => buf.extend_from_slice(&f64::MIN.to_le_bytes()),
        (ty, value) => panic!("cannot store {value:?} in a {ty} column"),
    }
}

/// Encode a string-heap handle into `buf`.
pub(crate) fn encode_string_handle(buf: &mut Vec<u8>, handle: u64) {
    buf.extend_from_slice(&handle.to_le_bytes());
}

/// A fixed-width element read back from a segment.
pub(crate) enum StoredValue {
    Value(DataValue),
    /// A handle into the owning chunk's string heap, possibly
    /// [`NULL_STRING_HANDLE`].
    StringHandle(u64),
}

/// Decode one fixed-width element.
pub(crate) fn decode_element(ty: DataType, bytes: &[u8]) -> StoredValue {
    match ty {
        DataType::Bool => StoredValue::Value(match bytes[0] {
            BOOL_NULL => DataValue::Null,
            v => DataValue::Bool(v != 0),
        }),
        DataType::Int32 => {
            let v = i32::from_le_bytes(bytes.try_into().unwrap());
            StoredValue::Value(if v == i32::MIN {
                DataValue::Null
            } else {
                DataValue::Int32(v)
            })
        }
        DataType::Int64 => {
            let v = i64::from_le_bytes(bytes.try_into().unwrap());
            StoredValue::Value(if v == i64::MIN {
                DataValue::Null
            } else {
                DataValue::Int64(v)
            })
        }
        DataType::Float64 => {
            let v = f64::from_le_bytes(bytes.try_into().unwrap());
            StoredValue::Value(if v == f64::MIN {
                DataValue::Null
            } else {
                DataValue::Float64(v.into())
            })
        }
        DataType::String => StoredValue::StringHandle(u64::from_le_bytes(bytes.try_into().unwrap())),
    }
}

/// A pointer into a column segment store: the segment index and the element
/// offset within it. Row chunks record one per column, marking where the
/// chunk's data begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnPointer {
    pub segment: usize,
    pub offset: usize,
}

/// One fixed-capacity storage unit of a column.
pub(crate) struct ColumnSegment {
    /// Row id of the first element in this segment.
    pub start: RowId,
    /// Number of valid elements.
    pub count: usize,
    pub data: Vec<u8>,
}

impl ColumnSegment {
    fn new(start: RowId) -> Self {
        ColumnSegment {
            start,
            count: 0,
            data: Vec::new(),
        }
    }
}

/// The append-only segment sequence of one column.
///
/// Segments are created when the tail segment is byte-full; a segment's
/// `start` always equals its predecessor's `start + count`.
pub(crate) struct ColumnSegmentStore {
    elem_size: usize,
    /// Elements per segment: `BLOCK_SIZE / elem_size`.
    capacity: usize,
    segments: Vec<ColumnSegment>,
}

impl ColumnSegmentStore {
    pub fn new(ty: DataType, block_size: usize) -> Self {
        let elem_size = ty.data_len();
        ColumnSegmentStore {
            elem_size,
            capacity: block_size / elem_size,
            segments: vec![ColumnSegment::new(0)],
        }
    }

    /// Total number of elements over all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.count).sum()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Where the next appended element will land.
    pub fn tail_pos(&self) -> ColumnPointer {
        ColumnPointer {
            segment: self.segments.len() - 1,
            offset: self.segments.last().unwrap().count,
        }
    }

    /// Append pre-encoded elements to the tail, filling the tail segment to
    /// capacity and opening new segments as needed.
    pub fn append(&mut self, encoded: &[u8]) {
        debug_assert_eq!(encoded.len() % self.elem_size, 0);
        let mut offset = 0;
        let mut remaining = encoded.len() / self.elem_size;
        while remaining > 0 {
            let tail = self.segments.last_mut().unwrap();
            let to_copy = (self.capacity - tail.count).min(remaining);
            if to_copy > 0 {
                tail.data
                    .extend_from_slice(&encoded[offset * self.elem_size..(offset + to_copy) * self.elem_size]);
                tail.count += to_copy;
                offset += to_copy;
                remaining -= to_copy;
            }
            if remaining > 0 {
                let start = tail.start + tail.count as RowId;
                self.segments.push(ColumnSegment::new(start));
            }
        }
    }

    fn segment_for_row(&self, row: RowId) -> usize {
        debug_assert!((row as usize) < self.len());
        self.segments.partition_point(|s| s.start <= row) - 1
    }

    /// The element stored for `row`.
    pub fn element(&self, row: RowId) -> &[u8] {
        let seg = &self.segments[self.segment_for_row(row)];
        let off = (row - seg.start) as usize;
        &seg.data[off * self.elem_size..(off + 1) * self.elem_size]
    }

    /// Mutable access to the element stored for `row`, for in-place update.
    pub fn element_mut(&mut self, row: RowId) -> &mut [u8] {
        let idx = self.segment_for_row(row);
        let seg = &mut self.segments[idx];
        let off = (row - seg.start) as usize;
        &mut seg.data[off * self.elem_size..(off + 1) * self.elem_size]
    }

    /// Visit `count` consecutive elements starting `skip` elements after
    /// `pointer`, walking segments in order.
    pub fn read_from(
        &self,
        pointer: ColumnPointer,
        skip: usize,
        count: usize,
        mut f: impl FnMut(&[u8]),
    ) {
        if count == 0 {
            return;
        }
        let mut seg = pointer.segment;
        let mut off = pointer.offset + skip;
        while off >= self.segments[seg].count {
            off -= self.segments[seg].count;
            seg += 1;
        }
        let mut remaining = count;
        while remaining > 0 {
            let s = &self.segments[seg];
            let to_read = (s.count - off).min(remaining);
            for k in off..off + to_read {
                f(&s.data[k * self.elem_size..(k + 1) * self.elem_size]);
            }
            remaining -= to_read;
            off = 0;
            seg += 1;
        }
    }
}
