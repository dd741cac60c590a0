use criterion::{Criterion, criterion_group, criterion_main};

use ssposfs::sspos::*;

criterion_group!(benches, sspos_bench);
criterion_main!(benches);

const BLOCK_COUNT: u32 = 16_384;

pub fn sspos_bench(c: &mut Criterion) {
    let meta = SsposMeta::new(SSPOS_DEFAULT_BLOCK_SIZE, BLOCK_COUNT).expect("layout failed");
    let mut buf = vec![0u8; meta.size_bytes() as usize];
    let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();

    c.bench_function("sspos_format_mem", |b| {
        b.iter(|| {
            let mut io = MemBlockIO::new(&mut buf);
            SsposFormatter::new(&mut io, &meta)
                .format(false)
                .expect("format failed");
        });
    });

    c.bench_function("sspos_create_write_mem", |b| {
        b.iter(|| {
            let mut io = MemBlockIO::new(&mut buf);
            SsposFormatter::new(&mut io, &meta)
                .format(false)
                .expect("format failed");
            let mut fs = SsposFs::mount(io).expect("mount failed");
            for i in 0..16 {
                let path = format!("/file_{i:02}");
                fs.create(&path, 0o644).expect("create failed");
                fs.write(&path, &payload, 0).expect("write failed");
            }
        });
    });

    {
        let mut io = MemBlockIO::new(&mut buf);
        SsposFormatter::new(&mut io, &meta)
            .format(false)
            .expect("format failed");
        let mut fs = SsposFs::mount(io).expect("mount failed");
        fs.create("/data", 0o644).expect("create failed");
        fs.write("/data", &payload, 0).expect("write failed");
    }

    let mut fs = SsposFs::mount(MemBlockIO::new(&mut buf)).expect("mount failed");
    c.bench_function("sspos_read_mem", |b| {
        b.iter(|| fs.read("/data", payload.len(), 0).expect("read failed"));
    });
    c.bench_function("sspos_check_mem", |b| {
        b.iter(|| fs.checker().check_all().expect("check failed"));
    });

    let file = tempfile::tempfile().expect("tempfile failed");
    file.set_len(meta.size_bytes()).expect("set_len failed");
    let mut io = StdBlockIO::new(file);
    SsposFormatter::new(&mut io, &meta)
        .format(false)
        .expect("format failed");
    let mut fs = SsposFs::mount(io).expect("mount failed");
    fs.create("/data", 0o644).expect("create failed");

    c.bench_function("sspos_write_file", |b| {
        b.iter(|| fs.write("/data", &payload, 0).expect("write failed"));
    });
}
