//! Track file round-trip tests
//!
//! Exercises the public API end to end on real files.

use iab_imf::pipeline::{
    extract_frames, frame_file_name, unwrap_track, wrap_directory, ExtractMode, ScanOptions,
};
use iab_imf::{ContainerIdentity, EditRate, Error, ErrorKind, FrameSink, FrameSource};
use iab_imf::{IabTrackReader, IabTrackWriter};
use std::fs;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use tempfile::tempdir;
use uuid::Uuid;

fn iab_frame(fill: u8) -> Vec<u8> {
    let mut frame = vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x40, 0x00];
    frame.resize(1034, fill);
    frame
}

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("track.mxf");
    let frames = [iab_frame(0xaa), iab_frame(0xbb)];

    let mut writer = IabTrackWriter::create(&path, &ContainerIdentity::default()).unwrap();
    for frame in &frames {
        writer.write_frame(frame).unwrap();
    }
    assert_eq!(writer.frames_written(), 2);
    writer.finalize().unwrap();
    drop(writer);

    let mut reader = IabTrackReader::open(&path).unwrap();
    assert_eq!(reader.frame_count().unwrap(), 2);
    for (i, frame) in frames.iter().enumerate().rev() {
        let read = reader.read_frame(i as u32).unwrap();
        assert_eq!(read.len(), 1034);
        assert_eq!(read.as_bytes(), &frame[..]);
    }
    assert!(matches!(
        reader.read_frame(2),
        Err(Error::FrameOutOfRange { index: 2, count: 2 })
    ));
    reader.close().unwrap();
    assert_eq!(reader.frame_count().unwrap_err().kind(), ErrorKind::State);
}

#[test]
fn test_frame_count_for_any_length() {
    for count in [0usize, 1, 7, 100] {
        let mut writer =
            IabTrackWriter::new(Cursor::new(Vec::new()), &ContainerIdentity::default()).unwrap();
        for i in 0..count {
            writer.write_frame(&(i as u32).to_be_bytes()).unwrap();
        }
        writer.finalize().unwrap();

        let mut reader = IabTrackReader::new(Cursor::new(writer.into_inner().into_inner())).unwrap();
        assert_eq!(reader.frame_count().unwrap(), count as u32);
        for i in 0..count {
            assert_eq!(
                reader.read_frame(i as u32).unwrap().as_bytes(),
                (i as u32).to_be_bytes()
            );
        }
    }
}

#[test]
fn test_identity_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("track.mxf");
    let asset = Uuid::parse_str("0123456789abcdef0123456789abcdef").unwrap();
    let identity = ContainerIdentity::default()
        .with_asset_uuid(asset)
        .with_edit_rate(EditRate::new(24000, 1001).unwrap())
        .with_spoken_language("en-US");

    let mut writer = IabTrackWriter::create(&path, &identity).unwrap();
    writer.write_frame(b"frame").unwrap();
    writer.finalize().unwrap();
    drop(writer);

    let reader = IabTrackReader::open(&path).unwrap();
    assert_eq!(reader.identity().unwrap(), identity);
    assert!(reader.modification_date().is_some());
}

#[test]
fn test_path_is_exclusive_within_process() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("track.mxf");

    let mut writer = IabTrackWriter::create(&path, &ContainerIdentity::default()).unwrap();
    assert!(matches!(
        IabTrackReader::open(&path),
        Err(Error::AlreadyOpen(_))
    ));
    assert!(matches!(
        IabTrackWriter::create(&path, &ContainerIdentity::default()),
        Err(Error::AlreadyOpen(_))
    ));
    writer.finalize().unwrap();
    drop(writer);

    let mut reader = IabTrackReader::open(&path).unwrap();
    assert!(matches!(
        IabTrackReader::open(&path),
        Err(Error::AlreadyOpen(_))
    ));
    reader.close().unwrap();
    IabTrackReader::open(&path).unwrap();
}

#[test]
fn test_directory_wrap_and_extract() {
    let frames = tempdir().unwrap();
    let work = tempdir().unwrap();
    // Natural order must put 10.iab after 9.iab
    for i in 0..11u8 {
        fs::write(frames.path().join(frame_file_name(i as u32)), iab_frame(i)).unwrap();
    }
    fs::write(frames.path().join(".hidden"), b"skipped").unwrap();
    let track = work.path().join("track.mxf");

    let summary = wrap_directory(
        frames.path(),
        &track,
        &ContainerIdentity::default(),
        &ScanOptions::default(),
    )
    .unwrap();
    assert_eq!(summary.frames, 11);

    let out = tempdir().unwrap();
    let extracted = unwrap_track(&track, out.path(), &ExtractMode::PerFrame).unwrap();
    assert_eq!(extracted.frames, 11);
    assert_eq!(extracted.bytes, summary.bytes);
    for i in 0..11u32 {
        let name = frame_file_name(i);
        assert_eq!(
            fs::read(out.path().join(&name)).unwrap(),
            fs::read(frames.path().join(&name)).unwrap()
        );
    }
}

#[test]
fn test_single_and_multi_file_extraction_agree() {
    let mut writer =
        IabTrackWriter::new(Cursor::new(Vec::new()), &ContainerIdentity::default()).unwrap();
    for fill in [3u8, 1, 3, 2] {
        writer.write_frame(&vec![fill; 10 + fill as usize]).unwrap();
    }
    writer.finalize().unwrap();
    let bytes = writer.into_inner().into_inner();

    let multi = tempdir().unwrap();
    let mut reader = IabTrackReader::new(Cursor::new(bytes.clone())).unwrap();
    extract_frames(&mut reader, multi.path(), &ExtractMode::PerFrame).unwrap();

    let single = tempdir().unwrap();
    let mut reader = IabTrackReader::new(Cursor::new(bytes)).unwrap();
    extract_frames(&mut reader, single.path(), &ExtractMode::Single("x.iab".into())).unwrap();

    let mut concatenated = Vec::new();
    for i in 0..4 {
        concatenated.extend(fs::read(multi.path().join(frame_file_name(i))).unwrap());
    }
    assert_eq!(fs::read(single.path().join("x.iab")).unwrap(), concatenated);
}

/// In-memory sink that runs out of space after `capacity` bytes
struct DiskFull {
    inner: Cursor<Vec<u8>>,
    capacity: u64,
}

impl Write for DiskFull {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.inner.position() + buf.len() as u64 > self.capacity {
            return Err(io::Error::new(io::ErrorKind::Other, "No space left on device"));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for DiskFull {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[test]
fn test_disk_full_leaves_no_valid_container() {
    let sink = DiskFull {
        inner: Cursor::new(Vec::new()),
        capacity: 4096,
    };
    let mut writer = IabTrackWriter::new(sink, &ContainerIdentity::default()).unwrap();

    let mut failed = false;
    for fill in 0..8u8 {
        if writer.write_frame(&iab_frame(fill)).is_err() {
            failed = true;
            break;
        }
    }
    assert!(failed);
    assert!(matches!(writer.finalize(), Err(Error::Poisoned)));

    let partial = writer.into_inner().inner.into_inner();
    assert!(matches!(
        IabTrackReader::new(Cursor::new(partial)),
        Err(Error::Incomplete)
    ));
}
