//! System language and region, read once and cached.

use cafe_platform::{ProductArea, ProductSettingsService, UserConfigService};
use cafe_types::error::{CafeError, Result};
use cafe_types::swkbd::{Language, Region};

use crate::LOG_TARGET;

/// User-config key holding the console language.
pub const LANGUAGE_KEY: &str = "cafe.language";

/// Read one unsigned system setting. The handle is always closed.
pub fn read_system_config_u32<P>(platform: &mut P, key: &str) -> Result<u32>
where
    P: UserConfigService + ?Sized,
{
    let handle = platform.uc_open()?;
    let value = platform.uc_read_u32(&handle, key);
    platform.uc_close(handle);
    value
}

/// Console language, English if unreadable or out of range.
pub fn read_system_language<P>(platform: &mut P) -> Language
where
    P: UserConfigService + ?Sized,
{
    let raw = match read_system_config_u32(platform, LANGUAGE_KEY) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!(target: LOG_TARGET, "reading {LANGUAGE_KEY} failed: {e}");
            return Language::English;
        },
    };
    Language::try_from(raw).unwrap_or_else(|_| {
        log::warn!(target: LOG_TARGET, "unknown system language {raw}, using English");
        Language::English
    })
}

fn read_product_area<P>(platform: &mut P) -> Result<ProductArea>
where
    P: ProductSettingsService + ?Sized,
{
    let handle = platform.mcp_open()?;
    let area = platform.mcp_product_area(&handle);
    platform.mcp_close(handle);
    area
}

/// Console region from the product area bits, Europe on any failure.
pub fn read_system_region<P>(platform: &mut P) -> Region
where
    P: ProductSettingsService + ?Sized,
{
    const ORDER: [(ProductArea, Region); 6] = [
        (ProductArea::JAPAN, Region::Japan),
        (ProductArea::USA, Region::Usa),
        (ProductArea::EUROPE, Region::Europe),
        (ProductArea::CHINA, Region::China),
        (ProductArea::KOREA, Region::Korea),
        (ProductArea::TAIWAN, Region::Taiwan),
    ];

    let area = match read_product_area(platform) {
        Ok(area) => area,
        Err(e) => {
            log::error!(target: LOG_TARGET, "reading product area failed: {e}");
            return Region::Europe;
        },
    };
    ORDER
        .iter()
        .find(|(bit, _)| area.contains(*bit))
        .map(|&(_, region)| region)
        .unwrap_or_else(|| {
            let e = CafeError::Platform(format!("no known region in {:#x}", area.bits()));
            log::warn!(target: LOG_TARGET, "{e}");
            Region::Europe
        })
}

/// Memoized system settings. Each value is read at most once per session.
#[derive(Debug, Default)]
pub struct SystemSettings {
    language: Option<Language>,
    region: Option<Region>,
}

impl SystemSettings {
    pub fn language<P>(&mut self, platform: &mut P) -> Language
    where
        P: UserConfigService + ?Sized,
    {
        *self
            .language
            .get_or_insert_with(|| read_system_language(platform))
    }

    pub fn region<P>(&mut self, platform: &mut P) -> Region
    where
        P: ProductSettingsService + ?Sized,
    {
        *self.region.get_or_insert_with(|| read_system_region(platform))
    }
}

#[cfg(test)]
mod tests {
    use cafe_platform::{SimCall, SimPlatform};

    use super::*;

    #[test]
    fn language_in_range() {
        let mut sim = SimPlatform::new();
        sim.system_language = Ok(3);
        assert_eq!(read_system_language(&mut sim), Language::German);
        assert_eq!(sim.calls, vec![SimCall::UcOpen, SimCall::UcClose]);
    }

    #[test]
    fn language_out_of_range_is_english() {
        let mut sim = SimPlatform::new();
        sim.system_language = Ok(12);
        assert_eq!(read_system_language(&mut sim), Language::English);
    }

    #[test]
    fn language_read_failure_is_english_and_closes() {
        let mut sim = SimPlatform::new();
        sim.system_language = Err(CafeError::Platform("read".into()));
        assert_eq!(read_system_language(&mut sim), Language::English);
        assert_eq!(sim.calls, vec![SimCall::UcOpen, SimCall::UcClose]);
    }

    #[test]
    fn language_open_failure_is_english() {
        let mut sim = SimPlatform::new();
        sim.fail_uc_open = true;
        assert_eq!(read_system_language(&mut sim), Language::English);
        assert_eq!(sim.calls, vec![SimCall::UcOpen]);
    }

    #[test]
    fn region_priority_order() {
        let mut sim = SimPlatform::new();
        sim.product_area = Ok(ProductArea::EUROPE | ProductArea::USA);
        assert_eq!(read_system_region(&mut sim), Region::Usa);
        sim.product_area = Ok(ProductArea::TAIWAN | ProductArea::KOREA);
        assert_eq!(read_system_region(&mut sim), Region::Korea);
        sim.product_area = Ok(ProductArea::JAPAN | ProductArea::TAIWAN);
        assert_eq!(read_system_region(&mut sim), Region::Japan);
    }

    #[test]
    fn region_failures_are_europe() {
        let mut sim = SimPlatform::new();
        sim.product_area = Ok(ProductArea::empty());
        assert_eq!(read_system_region(&mut sim), Region::Europe);
        sim.fail_mcp_open = true;
        sim.product_area = Ok(ProductArea::JAPAN);
        assert_eq!(read_system_region(&mut sim), Region::Europe);
    }

    #[test]
    fn settings_are_memoized() {
        let mut sim = SimPlatform::new();
        sim.system_language = Ok(0);
        sim.product_area = Ok(ProductArea::JAPAN);
        let mut settings = SystemSettings::default();
        assert_eq!(settings.language(&mut sim), Language::Japanese);
        assert_eq!(settings.region(&mut sim), Region::Japan);
        sim.system_language = Ok(2);
        sim.product_area = Ok(ProductArea::USA);
        assert_eq!(settings.language(&mut sim), Language::Japanese);
        assert_eq!(settings.region(&mut sim), Region::Japan);
        assert_eq!(sim.count(|c| *c == SimCall::UcOpen), 1);
        assert_eq!(sim.count(|c| *c == SimCall::McpOpen), 1);
    }
}
