use crate::config::OTP_TTL_MINUTES;

/// Password reset mail carrying the one-time code. Returns `(html, text)`.
pub fn password_reset_otp(name: &str, otp: &str) -> (String, String) {
    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Password Reset Code</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; background-color: #faf7f2; color: #1c1917;">
    <table role="presentation" style="width: 100%; border-collapse: collapse;">
        <tr>
            <td style="padding: 40px 20px;">
                <table role="presentation" style="max-width: 600px; margin: 0 auto; background: #ffffff; border-radius: 16px; overflow: hidden; border: 1px solid #e7e5e4;">
                    <tr>
                        <td style="padding: 40px 40px 20px; text-align: center; border-bottom: 1px solid #e7e5e4;">
                            <h1 style="margin: 0; font-size: 24px; font-weight: 700; color: #1c1917;">
                                Reset Your Password
                            </h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px;">
                            <p style="margin: 0 0 24px; font-size: 16px; line-height: 1.6; color: #57534e;">
                                Hi {name},
                            </p>
                            <p style="margin: 0 0 24px; font-size: 16px; line-height: 1.6; color: #57534e;">
                                We received a request to reset the password for your account. Use the code below to continue. It expires in {ttl} minutes.
                            </p>
                            <div style="background: #faf7f2; border: 1px solid #e7e5e4; border-radius: 12px; padding: 24px; margin-bottom: 32px; text-align: center;">
                                <span style="font-size: 32px; font-weight: 700; letter-spacing: 8px; color: #1c1917;">{otp}</span>
                            </div>
                            <p style="margin: 0; font-size: 14px; line-height: 1.6; color: #a8a29e;">
                                If you did not request a password reset, you can safely ignore this email. Your password will not change.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"##,
        name = name,
        otp = otp,
        ttl = OTP_TTL_MINUTES,
    );

    let text = format!(
        "Hi {name},\n\n\
         We received a request to reset the password for your account.\n\n\
         Your password reset code is: {otp}\n\n\
         The code expires in {ttl} minutes.\n\n\
         If you did not request a password reset, you can safely ignore this email.\n",
        name = name,
        otp = otp,
        ttl = OTP_TTL_MINUTES,
    );

    (html, text)
}
