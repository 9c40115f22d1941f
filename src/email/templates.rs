pub fn render_password_recovery(product_name: &str, username: &str, reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>{product_name}: Password recovery</h2>
    <p>Hi {username},</p>
    <p>We received a request to reset the password of your {product_name} account.</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #0070f3; color: white; text-decoration: none; border-radius: 4px;">Reset Password</a></p>
    <p style="color: #666; font-size: 14px;">The link stays valid for a limited time. If you didn't request this, you can ignore it.</p>
</body>
</html>"#
    )
}
