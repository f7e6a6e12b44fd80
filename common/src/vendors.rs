use pnet::util::MacAddr;

/// Resolves device manufacturers from MAC addresses.
pub trait VendorRepository: Send + Sync {
    /// Vendor name registered for the OUI of `mac`, or `None` when it is unknown.
    fn get_vendor(&self, mac: MacAddr) -> Option<String>;
}

/// Repository that knows no vendors, for scans that skip the OUI lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVendors;

impl VendorRepository for NoVendors {
    fn get_vendor(&self, _mac: MacAddr) -> Option<String> {
        None
    }
}
