//! Bounded table of symbolically addressed GPU resource slots.
//!
//! Slots are allocated in bulk at renderer creation and never change in
//! count, only in backing-storage dimensions. A slot's storage is lazily
//! (re)configured when the output surface resizes; within one frame every
//! pass observes the same resize state because the flag is cleared exactly
//! once, after all passes have run.

/// Total slot capacity, fixed for the lifetime of the renderer.
pub const MAX_SLOTS: usize = 512;

/// Symbolic slot address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotId {
    /// HDR color attachment of the capture pass.
    HdrColor,
    /// Bright-pass color attachment feeding the bloom chain.
    HdrBright,
    /// Depth/stencil buffer of the capture pass.
    HdrDepth,
    /// Bloom mip `i`, at the surface extent halved `i + 1` times.
    BloomMip(usize),
}

impl SlotId {
    fn index(self, chain_length: usize) -> usize {
        match self {
            SlotId::HdrColor => 0,
            SlotId::HdrBright => 1,
            SlotId::HdrDepth => 2,
            SlotId::BloomMip(i) => {
                assert!(i < chain_length, "bloom mip {i} out of chain of {chain_length}");
                3 + i
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SlotState {
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
}

#[derive(Debug, Default)]
struct Slot {
    state: Option<SlotState>,
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
}

#[derive(Debug)]
pub struct SlotTable {
    slots: Vec<Slot>,
    chain_length: usize,
}

impl SlotTable {
    pub fn new(chain_length: usize) -> Self {
        assert!(
            3 + chain_length <= MAX_SLOTS,
            "bloom chain of {chain_length} exceeds slot capacity"
        );
        let slots = (0..MAX_SLOTS).map(|_| Slot::default()).collect();
        Self {
            slots,
            chain_length,
        }
    }

    pub fn chain_length(&self) -> usize {
        self.chain_length
    }

    /// Whether the next `ensure_*` call for this slot will (re)allocate.
    pub fn needs_configure(&self, id: SlotId, resized: bool) -> bool {
        resized || self.slot(id).state.is_none()
    }

    /// Lazily (re)allocate a color slot at `width` x `height`.
    ///
    /// No-op unless the surface resized or the slot was never configured.
    /// Returns true when storage was (re)allocated. A zero extent is a
    /// contract violation and aborts.
    pub fn ensure_screen_texture(
        &mut self,
        device: &wgpu::Device,
        id: SlotId,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        resized: bool,
    ) -> bool {
        if !self.needs_configure(id, resized) {
            return false;
        }
        check_extent(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("slot screen texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let chain_length = self.chain_length;
        let slot = &mut self.slots[id.index(chain_length)];
        slot.texture = Some(texture);
        slot.view = Some(view);
        slot.state = Some(SlotState {
            width,
            height,
            format,
        });
        log::info!("[RENDERER] configured screen texture {id:?} at {width}x{height}");
        true
    }

    /// Depth/stencil counterpart of [`Self::ensure_screen_texture`].
    pub fn ensure_depth_buffer(
        &mut self,
        device: &wgpu::Device,
        id: SlotId,
        width: u32,
        height: u32,
        resized: bool,
    ) -> bool {
        if !self.needs_configure(id, resized) {
            return false;
        }
        check_extent(width, height);

        let format = wgpu::TextureFormat::Depth24PlusStencil8;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("slot depth buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let chain_length = self.chain_length;
        let slot = &mut self.slots[id.index(chain_length)];
        slot.texture = Some(texture);
        slot.view = Some(view);
        slot.state = Some(SlotState {
            width,
            height,
            format,
        });
        log::info!("[RENDERER] configured depth buffer {id:?} at {width}x{height}");
        true
    }

    /// View of a configured slot. An unconfigured slot here means a pass is
    /// about to read or attach storage that was never allocated, the moral
    /// equivalent of an incomplete framebuffer: fatal.
    pub fn view(&self, id: SlotId) -> &wgpu::TextureView {
        self.slot(id)
            .view
            .as_ref()
            .unwrap_or_else(|| panic!("slot {id:?} is not configured"))
    }

    /// Configured extent of a slot; fatal when unconfigured.
    pub fn extent(&self, id: SlotId) -> (u32, u32) {
        let state = self
            .slot(id)
            .state
            .unwrap_or_else(|| panic!("slot {id:?} is not configured"));
        (state.width, state.height)
    }

    fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.index(self.chain_length)]
    }

    #[cfg(test)]
    fn note_configured(&mut self, id: SlotId, width: u32, height: u32) {
        check_extent(width, height);
        let chain_length = self.chain_length;
        self.slots[id.index(chain_length)].state = Some(SlotState {
            width,
            height,
            format: wgpu::TextureFormat::Rgba16Float,
        });
    }
}

fn check_extent(width: u32, height: u32) {
    assert!(width > 0, "slot width not valid");
    assert!(height > 0, "slot height not valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_slot_needs_configure_even_without_resize() {
        let table = SlotTable::new(5);
        assert!(table.needs_configure(SlotId::HdrColor, false));
        assert!(table.needs_configure(SlotId::BloomMip(4), false));
    }

    #[test]
    fn configured_slot_reallocates_only_on_resize() {
        let mut table = SlotTable::new(5);
        table.note_configured(SlotId::HdrColor, 640, 480);

        // Steady-state frames leave the slot alone.
        assert!(!table.needs_configure(SlotId::HdrColor, false));
        // A resize invalidates exactly the frames where the flag is up.
        assert!(table.needs_configure(SlotId::HdrColor, true));
        table.note_configured(SlotId::HdrColor, 800, 600);
        assert!(!table.needs_configure(SlotId::HdrColor, false));
        assert_eq!(table.extent(SlotId::HdrColor), (800, 600));
    }

    #[test]
    #[should_panic(expected = "width not valid")]
    fn zero_extent_is_fatal() {
        let mut table = SlotTable::new(5);
        table.note_configured(SlotId::HdrColor, 0, 480);
    }

    #[test]
    #[should_panic(expected = "not configured")]
    fn reading_an_unconfigured_slot_is_fatal() {
        let table = SlotTable::new(5);
        table.extent(SlotId::BloomMip(0));
    }

    #[test]
    #[should_panic(expected = "out of chain")]
    fn bloom_mip_outside_chain_is_fatal() {
        let table = SlotTable::new(5);
        table.needs_configure(SlotId::BloomMip(5), false);
    }

    #[test]
    fn hdr_and_bloom_slots_never_alias() {
        let table = SlotTable::new(5);
        assert_ne!(
            SlotId::HdrColor.index(table.chain_length()),
            SlotId::BloomMip(0).index(table.chain_length())
        );
    }
}
