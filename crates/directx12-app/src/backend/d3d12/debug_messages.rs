use tracing::warn;
use windows::Win32::Graphics::Dxgi::*;

fn severity_name(severity: DXGI_INFO_QUEUE_MESSAGE_SEVERITY) -> &'static str {
    match severity {
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_CORRUPTION => "CORRUPTION",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_ERROR => "ERROR",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_WARNING => "WARNING",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_INFO => "INFO",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_MESSAGE => "MESSAGE",
        _ => "UNKNOWN",
    }
}

/// Logs and clears whatever the debug layer has stored since the last flush.
pub fn flush_debug_messages(info_queue: Option<&IDXGIInfoQueue>) {
    let Some(queue) = info_queue else {
        return;
    };

    let count = unsafe { queue.GetNumStoredMessages(DXGI_DEBUG_ALL) };
    for index in 0..count {
        let mut size: usize = 0;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, index, None, &mut size) }.is_err() {
            warn!(index, "Could not size debug message");
            continue;
        }

        // u64 storage keeps the message header aligned.
        let mut buffer = vec![0u64; size.div_ceil(8)];
        let message = buffer.as_mut_ptr() as *mut DXGI_INFO_QUEUE_MESSAGE;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, index, Some(message), &mut size) }.is_err() {
            warn!(index, "Could not read debug message");
            continue;
        }

        let (severity, id, description) = unsafe {
            let description = std::slice::from_raw_parts(
                (*message).pDescription as *const u8,
                (*message).DescriptionByteLength,
            );
            (
                severity_name((*message).Severity),
                (*message).ID,
                String::from_utf8_lossy(description)
                    .trim_end_matches('\0')
                    .trim()
                    .to_string(),
            )
        };
        warn!(severity, id, "DXGI debug: {description}");
    }
    unsafe { queue.ClearStoredMessages(DXGI_DEBUG_ALL) };
}
