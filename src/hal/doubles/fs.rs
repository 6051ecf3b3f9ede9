use crate::hal::fs::{FileHandle, Filesystem, Mode};
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

/// FatFs-flavored numeric codes, for realistic diagnostics in tests.
pub const CODE_DISK_ERROR: u32 = 1;
pub const CODE_NOT_FOUND: u32 = 4;
pub const CODE_NO_FILESYSTEM: u32 = 13;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FakeFsError(pub u32);

impl From<FakeFsError> for u32 {
    fn from(error: FakeFsError) -> Self { error.0 }
}

type Contents = Rc<RefCell<Vec<u8>>>;

/// In-memory filesystem with scriptable failures.
#[derive(Debug, Default)]
pub struct FakeFilesystem {
    pub files: BTreeMap<String, Contents>,
    pub mount_error: Option<u32>,
    pub mounted: bool,
    pub read_fails: bool,
    pub write_error: Option<u32>,
}

impl FakeFilesystem {
    pub fn with_file(path: &str, contents: &[u8]) -> Self {
        let mut filesystem = Self::default();
        filesystem.files.insert(path.into(), Rc::new(RefCell::new(contents.to_vec())));
        filesystem
    }

    pub fn contents_of(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).map(|contents| contents.borrow().clone())
    }
}

impl Filesystem for FakeFilesystem {
    type Error = FakeFsError;
    type File = FakeFile;

    fn mount(&mut self) -> Result<(), Self::Error> {
        match self.mount_error {
            Some(code) => Err(FakeFsError(code)),
            None => {
                self.mounted = true;
                Ok(())
            }
        }
    }

    fn unmount(&mut self) { self.mounted = false; }

    fn open(&mut self, path: &str, mode: Mode) -> Result<Self::File, Self::Error> {
        match mode {
            Mode::Read => {
                let data = self.files.get(path).ok_or(FakeFsError(CODE_NOT_FOUND))?;
                Ok(FakeFile {
                    data: Rc::clone(data),
                    cursor: 0,
                    fail_read: self.read_fails,
                    write_error: None,
                })
            }
            Mode::CreateAlways => {
                let data = Rc::new(RefCell::new(Vec::new()));
                self.files.insert(path.into(), Rc::clone(&data));
                Ok(FakeFile { data, cursor: 0, fail_read: false, write_error: self.write_error })
            }
        }
    }
}

#[derive(Debug)]
pub struct FakeFile {
    data: Contents,
    cursor: usize,
    fail_read: bool,
    write_error: Option<u32>,
}

impl FileHandle for FakeFile {
    type Error = FakeFsError;

    fn size(&self) -> usize { self.data.borrow().len() }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_read {
            return Err(FakeFsError(CODE_DISK_ERROR));
        }
        let data = self.data.borrow();
        let available = data.len().saturating_sub(self.cursor);
        let count = buffer.len().min(available);
        buffer[..count].copy_from_slice(&data[self.cursor..self.cursor + count]);
        self.cursor += count;
        Ok(count)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        if let Some(code) = self.write_error {
            return Err(FakeFsError(code));
        }
        self.data.borrow_mut().extend_from_slice(bytes);
        Ok(bytes.len())
    }
}
