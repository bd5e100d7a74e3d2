use tracing::debug;
use tracing::info;
use tracing::warn;

use super::AdapterPreference;
use super::ContextDesc;
use crate::app_error::AppResult;
use crate::app_error::GraphicsError;
use crate::app_error::WrapStep;
use crate::backend::Backend;
use crate::backend::DebugLayer;
use crate::backend::FeatureLevel;

// Debug layer, adapter, device. The adapter is released once the device exists.
pub(super) fn create_device<B: Backend>(
    backend: &mut B,
    desc: &ContextDesc,
) -> AppResult<(B::Device, DebugLayer)> {
    let debug_layer =
        enable_debug_layer(backend, desc.enable_debug_layer).step("enabling the debug layer")?;

    let adapter = select_adapter(backend, desc.adapter, desc.min_feature_level)
        .step("selecting an adapter")?;

    let device = backend
        .create_device(&adapter, desc.min_feature_level)
        .step("creating the device")?;
    debug!(level = ?desc.min_feature_level, "Created device");

    Ok((device, debug_layer))
}

/// An unavailable layer is fine; any other failure is not.
pub(super) fn enable_debug_layer<B: Backend>(
    backend: &mut B,
    requested: bool,
) -> AppResult<DebugLayer> {
    if !requested {
        debug!("Debug layer not requested");
        return Ok(DebugLayer::Disabled);
    }
    let layer = backend.enable_debug_layer()?;
    match layer {
        DebugLayer::Enabled => info!("Debug layer enabled"),
        DebugLayer::Unavailable => warn!("Debug layer unavailable, continuing without validation"),
        DebugLayer::Disabled => {}
    }
    Ok(layer)
}

/// Tries adapters in index order and keeps the first one a device can be
/// created on at `level`.
pub(super) fn select_adapter<B: Backend>(
    backend: &mut B,
    preference: AdapterPreference,
    level: FeatureLevel,
) -> AppResult<B::Adapter> {
    if preference == AdapterPreference::Warp {
        let adapter = backend.warp_adapter()?;
        if !backend.supports_feature_level(&adapter, level) {
            debug!(?level, "WARP adapter does not support feature level");
            return Err(GraphicsError::NoSuitableAdapter.into());
        }
        info!("Using WARP adapter");
        return Ok(adapter);
    }

    for index in 0u32.. {
        let Some(adapter) = backend.enum_adapter(index)? else {
            break;
        };
        let name = backend.adapter_name(&adapter)?;

        if backend.supports_feature_level(&adapter, level) {
            info!(index, adapter = %name, "Selected adapter");
            return Ok(adapter);
        }
        debug!(index, adapter = %name, ?level, "Adapter does not support feature level");
    }

    Err(GraphicsError::NoSuitableAdapter.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::DebugLayerSupport;
    use crate::backend::headless::HeadlessAdapter;
    use crate::backend::headless::HeadlessBackend;
    use crate::backend::headless::TraceEvent;

    #[test]
    fn first_capable_adapter_wins() {
        let mut backend = HeadlessBackend::with_adapters(vec![
            HeadlessAdapter::new("old", FeatureLevel::Level11_1),
            HeadlessAdapter::new("good", FeatureLevel::Level12_0),
            HeadlessAdapter::new("better", FeatureLevel::Level12_1),
        ]);
        let adapter = select_adapter(
            &mut backend,
            AdapterPreference::Hardware,
            FeatureLevel::Level12_0,
        )
        .unwrap();

        assert_eq!(adapter.name, "good");
        assert_eq!(
            backend.trace(),
            &[
                TraceEvent::AdapterChecked {
                    index: 0,
                    supported: false
                },
                TraceEvent::AdapterChecked {
                    index: 1,
                    supported: true
                },
            ]
        );
    }

    #[test]
    fn warp_skips_enumeration_but_is_still_checked() {
        let mut backend = HeadlessBackend::with_adapters(Vec::new());
        let adapter =
            select_adapter(&mut backend, AdapterPreference::Warp, FeatureLevel::Level12_0).unwrap();
        assert!(adapter.name.contains("WARP"));
        assert_eq!(
            backend.trace(),
            &[TraceEvent::AdapterChecked {
                index: u32::MAX,
                supported: true
            }]
        );
    }

    #[test]
    fn warp_below_the_requested_level_is_rejected() {
        let mut backend =
            HeadlessBackend::with_adapters(Vec::new()).warp_feature_level(FeatureLevel::Level11_1);
        let error = select_adapter(&mut backend, AdapterPreference::Warp, FeatureLevel::Level12_0)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GraphicsError>(),
            Some(GraphicsError::NoSuitableAdapter)
        ));
    }

    #[test]
    fn debug_layer_outcomes() {
        let mut unavailable = HeadlessBackend::new().debug_layer(DebugLayerSupport::Unavailable);
        assert_eq!(
            enable_debug_layer(&mut unavailable, true).unwrap(),
            DebugLayer::Unavailable
        );

        let mut broken = HeadlessBackend::new().debug_layer(DebugLayerSupport::Broken);
        assert!(enable_debug_layer(&mut broken, true).is_err());
        assert_eq!(
            enable_debug_layer(&mut broken, false).unwrap(),
            DebugLayer::Disabled
        );
    }
}
