//! List commands implementation

use extflash_core::chip::{ChipVariant, FlashChip};

use super::format_size;

/// List all supported chips
pub fn list_chips(vendor_filter: Option<&str>) {
    println!("Supported flash chips:");
    println!();
    println!(
        "{:<12} {:<12} {:>8} {:>10} {:>6}",
        "Vendor", "Name", "Size", "JEDEC ID", "Mode"
    );
    println!("{}", "-".repeat(52));

    for variant in ChipVariant::ALL {
        let chip = variant.descriptor();
        // Apply vendor filter if specified
        if let Some(vendor) = vendor_filter {
            if !chip.vendor.to_lowercase().contains(&vendor.to_lowercase()) {
                continue;
            }
        }

        println!(
            "{:<12} {:<12} {:>8} {:>10} {:>6}",
            chip.vendor,
            chip.name,
            format_size(chip.geometry.total_size),
            chip.id.to_string(),
            chip.bus.mode.number()
        );
    }
}
