use fimg_rs::{Context, DeviceConfig, DeviceRegistry, FimgResult};

fn main() -> FimgResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("--- FIMG-3DSE Context Switch ---");

    let config = DeviceConfig::from_env()?;
    println!(
        "Device: {} | Registers: {} @ 0x{:08x} (0x{:x} bytes)",
        config.device_path.display(),
        config.mem_path.display(),
        config.sfr_base,
        config.sfr_size
    );

    let registry = DeviceRegistry::new(config);

    // 1. Two clients share one open device
    let mut first = match Context::create(&registry) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error creating context (Is the s3c-g3d driver loaded?): {e}");
            return Err(e);
        }
    };
    let mut second = Context::create(&registry)?;
    println!("Contexts: {} | Device opens: {}", registry.users(), registry.stats().opens);

    // 2. Give each one a framebuffer
    let fb_a = first.allocator().allocate(320 * 240 * 2)?;
    let fb_b = second.allocator().allocate(800 * 480 * 2)?;
    println!(
        "Framebuffers: {} bytes @ 0x{:08x}, {} bytes @ 0x{:08x}",
        fb_a.size(),
        fb_a.phys_addr(),
        fb_b.size(),
        fb_b.phys_addr()
    );

    first.fragment.color_addr = fb_a.phys_addr();
    first.fragment.fb_width = 320;
    second.fragment.color_addr = fb_b.phys_addr();
    second.fragment.fb_width = 800;

    // 3. Hand the GPU back and forth
    for ctx in [&first, &second, &first] {
        ctx.restore()?;
    }

    first.allocator().free(fb_a)?;
    second.allocator().free(fb_b)?;

    // 4. The last context out closes the device
    first.destroy();
    second.destroy();
    let stats = registry.stats();
    println!(
        "Device open: {} | opens: {} | closes: {}",
        registry.is_open(),
        stats.opens,
        stats.closes
    );

    Ok(())
}
