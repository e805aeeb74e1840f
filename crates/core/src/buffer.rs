//! Point-cloud buffer shared by every sensor
//!
//! Detections of all channels are stored back to back, in channel order, with
//! a count table giving each channel's share. The buffer is allocated once
//! per sensor and reset every tick, keeping its capacity.
//!
//! # Wire layout
//!
//! All values in host byte order:
//!
//! | bytes | content |
//! |---|---|
//! | 4 | `horizontal_angle: f32` (radians) |
//! | 4 | `channel_count: u32` |
//! | 4 × `channel_count` | per-channel detection counts (`u32`) |
//! | rest | detection records, `size_of::<D>()` bytes each |

use crate::core_types::detection::DetectionRecord;
use crate::error::BufferDecodeError;
use std::mem::size_of;

const HEADER_BYTES: usize = size_of::<f32>() + size_of::<u32>();

/// Per-channel detections of one sensor tick
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloudBuffer<D> {
    horizontal_angle: f32,
    counts: Vec<u32>,
    records: Vec<D>,
}

impl<D> Default for PointCloudBuffer<D> {
    fn default() -> Self {
        PointCloudBuffer {
            horizontal_angle: 0.0,
            counts: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl<D: DetectionRecord> PointCloudBuffer<D> {
    /// Empty buffer with room for `channel_count` channels.
    #[must_use]
    pub fn new(channel_count: usize) -> Self {
        let mut buffer = Self::default();
        buffer.reset(channel_count);
        buffer
    }

    /// Clear detections and counts, keeping allocated capacity.
    pub fn reset(&mut self, channel_count: usize) {
        self.counts.clear();
        self.counts.reserve(channel_count);
        self.records.clear();
    }

    /// Reserve room for `additional` more detections.
    pub fn reserve(&mut self, additional: usize) {
        self.records.reserve(additional);
    }

    /// Append the next channel's detections.
    ///
    /// Channels must be pushed in ascending index order after a
    /// [`reset`](Self::reset).
    pub fn push_channel(&mut self, detections: &[D]) {
        let count = u32::try_from(detections.len()).unwrap_or(u32::MAX);
        self.counts.push(count);
        self.records.extend_from_slice(detections);
    }

    /// Sweep position at the end of the tick (radians).
    pub fn horizontal_angle(&self) -> f32 {
        self.horizontal_angle
    }

    pub fn set_horizontal_angle(&mut self, radians: f32) {
        self.horizontal_angle = radians;
    }

    /// Number of channels written since the last reset.
    pub fn channel_count(&self) -> usize {
        self.counts.len()
    }

    /// Detection count of `channel`, 0 if the channel was not written.
    pub fn point_count(&self, channel: usize) -> usize {
        self.counts.get(channel).map_or(0, |&c| c as usize)
    }

    /// Count table in channel order.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Total detections across all channels.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every detection, channel after channel.
    pub fn records(&self) -> &[D] {
        &self.records
    }

    /// Detections of one channel.
    pub fn channel(&self, channel: usize) -> &[D] {
        if channel >= self.counts.len() {
            return &[];
        }
        let start: usize = self.counts[..channel].iter().map(|&c| c as usize).sum();
        &self.records[start..start + self.counts[channel] as usize]
    }

    /// Iterate `(channel index, detections)` in channel order.
    pub fn channels(&self) -> impl Iterator<Item = (usize, &[D])> + '_ {
        let mut offset = 0;
        self.counts.iter().enumerate().map(move |(index, &count)| {
            let start = offset;
            offset += count as usize;
            (index, &self.records[start..offset])
        })
    }

    /// Serialize to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let record_bytes: &[u8] = bytemuck::cast_slice(&self.records);
        let mut out = Vec::with_capacity(
            HEADER_BYTES + self.counts.len() * size_of::<u32>() + record_bytes.len(),
        );
        out.extend_from_slice(&self.horizontal_angle.to_ne_bytes());
        let channel_count = u32::try_from(self.counts.len()).unwrap_or(u32::MAX);
        out.extend_from_slice(&channel_count.to_ne_bytes());
        out.extend_from_slice(bytemuck::cast_slice(&self.counts));
        out.extend_from_slice(record_bytes);
        out
    }

    /// Rebuild a buffer from the wire layout.
    pub fn decode(bytes: &[u8]) -> Result<Self, BufferDecodeError> {
        if bytes.len() < HEADER_BYTES {
            return Err(BufferDecodeError::Truncated {
                needed: HEADER_BYTES,
                available: bytes.len(),
            });
        }
        let horizontal_angle: f32 = bytemuck::pod_read_unaligned(&bytes[0..4]);
        let channel_count: u32 = bytemuck::pod_read_unaligned(&bytes[4..8]);
        let channel_count = channel_count as usize;

        let counts_end = channel_count
            .checked_mul(size_of::<u32>())
            .map_or(usize::MAX, |count_bytes| count_bytes.saturating_add(HEADER_BYTES));
        if bytes.len() < counts_end {
            return Err(BufferDecodeError::Truncated {
                needed: counts_end,
                available: bytes.len(),
            });
        }
        let counts: Vec<u32> = bytemuck::pod_collect_to_vec(&bytes[HEADER_BYTES..counts_end]);

        let declared: usize = counts.iter().map(|&c| c as usize).sum();
        let needed = declared
            .checked_mul(size_of::<D>())
            .and_then(|record_bytes| record_bytes.checked_add(counts_end))
            .unwrap_or(usize::MAX);
        if bytes.len() < needed {
            return Err(BufferDecodeError::Truncated {
                needed,
                available: bytes.len(),
            });
        }
        if bytes.len() > needed {
            return Err(BufferDecodeError::CountMismatch {
                declared,
                actual: (bytes.len() - counts_end) / size_of::<D>(),
            });
        }
        let records: Vec<D> = bytemuck::pod_collect_to_vec(&bytes[counts_end..]);

        Ok(PointCloudBuffer {
            horizontal_angle,
            counts,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::detection::{LidarDetection, RadarDetection};
    use crate::core_types::vec3::Vec3;

    fn det(x: f32) -> LidarDetection {
        LidarDetection::new(Vec3::new(x, 0.0, 0.0), 0.5)
    }

    #[test]
    fn test_channels_merge_in_order() {
        let mut buffer = PointCloudBuffer::new(3);
        buffer.push_channel(&[det(1.0), det(2.0)]);
        buffer.push_channel(&[]);
        buffer.push_channel(&[det(3.0)]);

        assert_eq!(buffer.counts(), &[2, 0, 1]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.channel(0), &[det(1.0), det(2.0)]);
        assert!(buffer.channel(1).is_empty());
        assert_eq!(buffer.channel(2), &[det(3.0)]);
        assert!(buffer.channel(7).is_empty());

        let collected: Vec<usize> = buffer.channels().map(|(_, d)| d.len()).collect();
        assert_eq!(collected, vec![2, 0, 1]);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut buffer = PointCloudBuffer::new(1);
        buffer.push_channel(&vec![det(1.0); 64]);
        let capacity = buffer.records.capacity();

        buffer.reset(1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.channel_count(), 0);
        assert_eq!(buffer.records.capacity(), capacity);
    }

    #[test]
    fn test_wire_layout() {
        let mut buffer = PointCloudBuffer::new(2);
        buffer.push_channel(&[det(1.0)]);
        buffer.push_channel(&[det(2.0), det(4.0)]);
        buffer.set_horizontal_angle(1.25);

        let bytes = buffer.encode();
        assert_eq!(bytes.len(), 8 + 2 * 4 + 3 * 16);
        assert_eq!(&bytes[0..4], &1.25_f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &2_u32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &1_u32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &2_u32.to_ne_bytes());

        let decoded = PointCloudBuffer::<LidarDetection>::decode(&bytes).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        let mut buffer = PointCloudBuffer::new(1);
        buffer.push_channel(&[RadarDetection::default(); 2]);
        let bytes = buffer.encode();

        assert!(matches!(
            PointCloudBuffer::<RadarDetection>::decode(&bytes[..bytes.len() - 1]),
            Err(BufferDecodeError::Truncated { .. })
        ));
        let mut padded = bytes.clone();
        padded.extend_from_slice(&[0; 16]);
        assert!(matches!(
            PointCloudBuffer::<RadarDetection>::decode(&padded),
            Err(BufferDecodeError::CountMismatch {
                declared: 2,
                actual: 3
            })
        ));
        assert!(matches!(
            PointCloudBuffer::<RadarDetection>::decode(&[0; 3]),
            Err(BufferDecodeError::Truncated { needed: 8, .. })
        ));
    }
}
