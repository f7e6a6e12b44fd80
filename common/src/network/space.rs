//! # Subnet Space
//!
//! The ordered set of candidate subnets a scan walks through.
//!
//! A space is a short list of arithmetic segments (first network, count, stride), so
//! even the 69,888 subnets of a full RFC1918 sweep cost a handful of integers. Every
//! call to [`SubnetSpace::iter`] starts again from the beginning.

use std::net::Ipv4Addr;

use crate::network::subnet::{DEFAULT_PREFIX, Subnet};
use crate::network::target::ManualTarget;

const SLASH24_STRIDE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    first: u32,
    count: u32,
    stride: u32,
    prefix: u8,
}

impl Segment {
    const fn slash24s(a: u8, b: u8, c: u8, count: u32, stride: u32) -> Self {
        Self {
            first: u32::from_be_bytes([a, b, c, 0]),
            count,
            stride,
            prefix: DEFAULT_PREFIX,
        }
    }

    fn nth(&self, idx: u32) -> Subnet {
        Subnet::from_u32(self.first.wrapping_add(idx * self.stride), self.prefix)
    }
}

/// Common private subnets: `10.0.1-254.0`, `172.16-31.0.0`, `192.168.0-255.0`.
const QUICK: [Segment; 3] = [
    Segment::slash24s(10, 0, 1, 254, SLASH24_STRIDE),
    Segment::slash24s(172, 16, 0, 16, 1 << 16),
    Segment::slash24s(192, 168, 0, 256, SLASH24_STRIDE),
];

/// Every /24 of 10.0.0.0/8, 172.16.0.0/12 and 192.168.0.0/16.
const FULL: [Segment; 3] = [
    Segment::slash24s(10, 0, 0, 65_536, SLASH24_STRIDE),
    Segment::slash24s(172, 16, 0, 4_096, SLASH24_STRIDE),
    Segment::slash24s(192, 168, 0, 256, SLASH24_STRIDE),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetSpace {
    segments: Vec<Segment>,
}

impl SubnetSpace {
    pub fn quick() -> Self {
        Self { segments: QUICK.to_vec() }
    }

    pub fn full() -> Self {
        Self { segments: FULL.to_vec() }
    }

    pub fn manual(target: &ManualTarget) -> Self {
        let segment = match *target {
            ManualTarget::Host { addr } => Segment {
                first: addr.into(),
                count: 1,
                stride: 0,
                prefix: 32,
            },
            ManualTarget::Cidr { subnet } => Segment {
                first: subnet.network().into(),
                count: 1,
                stride: 0,
                prefix: subnet.prefix(),
            },
            ManualTarget::Range { start, end } => range_segment(start, end),
        };
        Self { segments: vec![segment] }
    }

    /// A space holding one subnet.
    pub fn single(subnet: Subnet) -> Self {
        Self {
            segments: vec![Segment {
                first: subnet.network().into(),
                count: 1,
                stride: 0,
                prefix: subnet.prefix(),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> SubnetIter<'_> {
        SubnetIter {
            segments: &self.segments,
            segment: 0,
            idx: 0,
        }
    }
}

impl<'a> IntoIterator for &'a SubnetSpace {
    type Item = Subnet;
    type IntoIter = SubnetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Steps 256 addresses at a time from `start` up to and including `end`.
///
/// Each stepped address is reported as the /24 containing it, so `10.0.0.5-10.0.2.0`
/// gives `10.0.0.0/24` and `10.0.1.0/24` (the third step, `10.0.2.5`, is past `end`).
fn range_segment(start: Ipv4Addr, end: Ipv4Addr) -> Segment {
    let first: u32 = start.into();
    let last: u32 = end.into();
    let count = if last < first {
        0
    } else {
        (last - first) / SLASH24_STRIDE + 1
    };
    Segment {
        first,
        count,
        stride: SLASH24_STRIDE,
        prefix: DEFAULT_PREFIX,
    }
}

pub struct SubnetIter<'a> {
    segments: &'a [Segment],
    segment: usize,
    idx: u32,
}

impl Iterator for SubnetIter<'_> {
    type Item = Subnet;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let segment = self.segments.get(self.segment)?;
            if self.idx < segment.count {
                let subnet = segment.nth(self.idx);
                self.idx += 1;
                return Some(subnet);
            }
            self.segment += 1;
            self.idx = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: usize = self
            .segments
            .iter()
            .skip(self.segment)
            .enumerate()
            .map(|(i, s)| {
                if i == 0 {
                    s.count.saturating_sub(self.idx) as usize
                } else {
                    s.count as usize
                }
            })
            .sum();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SubnetIter<'_> {}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
