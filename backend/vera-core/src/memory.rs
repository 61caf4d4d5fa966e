//! Wrapping access to a flat, circular address space.

pub const VRAM_LEN: usize = 0x20000;

/// A flat byte-addressable memory region. Implementors only need to handle in-bounds contiguous
/// accesses; the free functions in this module handle address normalization and wraparound.
pub trait AddressSpace {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `out.len()` bytes starting at `address`. Callers guarantee that
    /// `address + out.len() <= self.len()`.
    fn read_contiguous(&self, address: usize, out: &mut [u8]);

    /// Write one byte. Callers guarantee that `address < self.len()`.
    fn write_byte(&mut self, address: usize, value: u8);
}

impl AddressSpace for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read_contiguous(&self, address: usize, out: &mut [u8]) {
        out.copy_from_slice(&self[address..address + out.len()]);
    }

    fn write_byte(&mut self, address: usize, value: u8) {
        self[address] = value;
    }
}

impl<const LEN: usize> AddressSpace for [u8; LEN] {
    fn len(&self) -> usize {
        LEN
    }

    fn read_contiguous(&self, address: usize, out: &mut [u8]) {
        self.as_slice().read_contiguous(address, out);
    }

    fn write_byte(&mut self, address: usize, value: u8) {
        self[address] = value;
    }
}

impl AddressSpace for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn read_contiguous(&self, address: usize, out: &mut [u8]) {
        self.as_slice().read_contiguous(address, out);
    }

    fn write_byte(&mut self, address: usize, value: u8) {
        self[address] = value;
    }
}

#[must_use]
pub fn read_byte<S: AddressSpace + ?Sized>(space: &S, address: usize) -> u8 {
    let mut byte = [0];
    read_range(space, address, &mut byte);
    byte[0]
}

/// Fill `out` with the bytes starting at `address`, wrapping past the end of the address space
/// back to 0. A request no longer than the address space is served with at most two contiguous
/// reads. An empty address space reads as all zeroes.
pub fn read_range<S: AddressSpace + ?Sized>(space: &S, address: usize, out: &mut [u8]) {
    let len = space.len();
    if len == 0 {
        out.fill(0);
        return;
    }

    let mut address = address % len;
    let mut remaining = out;
    while !remaining.is_empty() {
        let chunk_len = remaining.len().min(len - address);
        let (chunk, rest) = remaining.split_at_mut(chunk_len);
        space.read_contiguous(address, chunk);

        remaining = rest;
        address = 0;
    }
}

#[must_use]
pub fn read_range_vec<S: AddressSpace + ?Sized>(
    space: &S,
    address: usize,
    length: usize,
) -> Vec<u8> {
    let mut bytes = vec![0; length];
    read_range(space, address, &mut bytes);
    bytes
}

pub fn write_byte<S: AddressSpace + ?Sized>(space: &mut S, address: usize, value: u8) {
    let len = space.len();
    if len == 0 {
        return;
    }

    space.write_byte(address % len, value);
}
